//! Offline solvers whose results are fed to the emulator before a run.
//!
//! Neither solver calls into the emulator. The [teleporter] search produces a register value
//! that is applied as a [Patch](crate::memory::Patch), and the [vault] search produces a
//! route that the player types in as input.

pub mod teleporter;
pub mod vault;
