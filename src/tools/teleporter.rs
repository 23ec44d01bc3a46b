//! Search for the register 7 value expected by the teleporter confirmation routine.
//!
//! The routine evaluates a two-argument recursive function parameterized by register 7:
//!
//! ```text
//! f(0, m) = (m + 1) mod 32768
//! f(n, 0) = f(n - 1, r7)
//! f(n, m) = f(n - 1, f(n, m - 1))
//! ```
//!
//! Evaluating it directly is intractable, but `f(n, m)` only depends on `f(n, i)` for `i < m`
//! and on arbitrary values of the previous row, so a left-to-right, top-to-bottom sweep over
//! the whole 15-bit domain tabulates it in `rows * 32768` steps per seed.

use std::ops::Range;

use slog::{debug, o, trace, Discard, Logger};

use crate::instruction::{Register, MODULUS};
use crate::memory::Patch;

/// Number of columns in every row of the table.
pub const COLUMNS: usize = MODULUS as usize;

/// Every seed that fits in a register.
pub const SEEDS: Range<u16> = 0..MODULUS as u16;

/// Tabulation of `f(n, _)` for one seed.
///
/// Each row only depends on the one above it, so two rows are kept regardless of depth. After
/// [compute](Table::compute) the current row holds `f(rows - 1, _)`.
#[derive(Clone)]
pub struct Table {
    rows: usize,
    previous: Vec<u16>,
    current: Vec<u16>,
}

impl Table {
    /// Creates a table sweeping `f(n, _)` for `n < rows`. At least one row is always computed.
    pub fn new(rows: usize) -> Table {
        Table {
            rows: std::cmp::max(rows, 1),
            previous: vec![0; COLUMNS],
            current: vec![0; COLUMNS],
        }
    }

    /// Sweeps the rows for `seed`, overwriting the previous contents.
    pub fn compute(&mut self, seed: u16) {
        let seed = seed as usize % COLUMNS;

        for (m, cell) in self.current.iter_mut().enumerate() {
            *cell = ((m + 1) % COLUMNS) as u16;
        }

        for _ in 1..self.rows {
            std::mem::swap(&mut self.previous, &mut self.current);

            let (previous, current) = (&self.previous, &mut self.current);
            current[0] = previous[seed];

            for m in 1..COLUMNS {
                current[m] = previous[current[m - 1] as usize];
            }
        }
    }

    /// Returns `f(rows - 1, m)`. Panics if `m` lies outside the row.
    pub fn get(&self, m: usize) -> u16 {
        self.current[m]
    }
}

/// Finds the first seed for which `f(n, m) == result`.
pub fn find_key(n: usize, m: usize, result: u16) -> Option<u16> {
    find_key_with_logger(SEEDS, n, m, result, None::<Logger>)
}

/// Like [find_key], but only tries the seeds in `seeds`.
pub fn find_key_in(seeds: Range<u16>, n: usize, m: usize, result: u16) -> Option<u16> {
    find_key_with_logger(seeds, n, m, result, None::<Logger>)
}

pub fn find_key_with_logger<L>(
    seeds: Range<u16>,
    n: usize,
    m: usize,
    result: u16,
    logger: L,
) -> Option<u16>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "teleporter", "n" => n, "m" => m, "result" => result));

    if m >= COLUMNS {
        debug!(logger, "column outside the domain");
        return None;
    }

    let seeds = seeds.start..std::cmp::min(seeds.end, SEEDS.end);
    let mut table = Table::new(n + 1);

    for seed in seeds {
        table.compute(seed);

        if seed % 1024 == 0 {
            trace!(logger, "searching"; "seed" => seed);
        }

        if table.get(m) == result {
            debug!(logger, "found key"; "seed" => seed);
            return Some(seed);
        }
    }

    debug!(logger, "no key found");
    None
}

/// Patches that start the program with `r7` in register 7 and skip its own validation of the
/// register.
///
/// The `set r7 r7` at 521 replaces the original initialization, and `jmp 21` over 5485..=5486
/// followed by `noop`s bypasses the confirmation routine.
pub fn teleporter_patches(r7: u16) -> Vec<Patch> {
    let mut patches = vec![
        Patch::new(521, 1),
        Patch::new(522, Register::R7.address()),
        Patch::new(523, r7),
        Patch::new(5485, 6),
    ];

    patches.extend((5486..=5490).map(|address| Patch::new(address, 21)));
    patches
}
