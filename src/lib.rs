//! A crate for running and inspecting programs written for the virtual machine of the Synacor
//! challenge.
//!
//! Currently this crate provides the functionality to:
//! - Load binary images of little-endian 16-bit words.
//! - Execute them, with line buffered terminal input and character output.
//! - Patch memory and registers before a run.
//! - Disassemble address ranges into readable listings.
//! - Solve the teleporter and orb vault puzzles offline.
//!
//! # Architecture
//!
//! - 32768 words of memory, 8 registers and an unbounded stack. Words are 15 bits wide and all
//!   arithmetic is modulo 32768.
//! - Operands in `0..=32767` are literals, `32768..=32775` refer to registers `r0..r7`, and
//!   everything above is invalid.
//! - 22 instructions taking zero to three operands.
//!
//! # Example
//! ```
//! use synacor::{
//!     image::Image,
//!     memory::Memory,
//!     emulator::{Emulator, State, TestIo},
//! };
//!
//! fn main() {
//!     // out 'A'; halt
//!     let image = Image::parse(&[19, 0, 65, 0, 0, 0]);
//!
//!     // Load the image at address 0.
//!     let memory = Memory::with_image(&image)
//!         .expect("image does not fit in memory");
//!
//!     let mut emulator = Emulator::new(memory, TestIo::new());
//!
//!     // Execute until the program halts.
//!     let state = emulator.run()
//!         .expect("an error occured while emulating the program");
//!
//!     assert_eq!(state, State::Halted);
//!     assert_eq!(emulator.io.output_string(), "A");
//! }
//! ```
//!
//! # Executables
//!
//! ## `synrun`
//!
//! Runs an image on the terminal, or writes its disassembly with `--disassemble`.
//!
//! ```text
//! synrun challenge.bin --teleporter 25734
//! synrun challenge.bin --disassemble --to 6068 --output disassembly.txt
//! ```
//!
//! ## `synsolve`
//!
//! Runs the offline puzzle solvers.
//!
//! ```text
//! synsolve teleporter --row 4 --column 1 --result 6
//! synsolve vault
//! ```
pub mod disassembler;
pub mod emulator;
pub mod error;
pub mod image;
pub mod input;
pub mod instruction;
pub mod memory;
pub mod parsing;
pub mod tools;
