//! Error types shared by the emulator, the image loader and the command line parsers.

use std::error;
use std::fmt::{self, Display};
use std::io;

/// An unrecoverable condition raised while decoding or executing a program.
///
/// Every fault is fatal to the current run: the [Emulator](crate::emulator::Emulator)
/// transitions to [State::Faulted](crate::emulator::State::Faulted) and refuses to step again.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// The operand is neither a literal nor one of the eight register references.
    AddressOutOfRange {
        /// The offending operand word.
        address: u16,
    },

    /// A literal was used where a register reference was required.
    InvalidWriteTarget {
        /// The offending operand word.
        address: u16,
    },

    /// The word at the program counter is not a known opcode.
    UnknownOpcode {
        /// The word that was read.
        opcode: u16,
        /// The address of the word.
        address: usize,
    },

    /// The decoder tried to read past the end of memory.
    FetchOutOfBounds {
        /// The first address that could not be read.
        address: usize,
    },

    /// A `pop` or `ret` was executed with an empty stack.
    StackUnderflow,

    /// A `mod` was executed with a zero divisor.
    DivisionByZeroModulus,

    /// The input source ended while an `in` instruction was waiting for a line.
    InputClosed,

    /// The input or output device failed.
    Io(io::ErrorKind),
}

impl Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Fault::AddressOutOfRange { address } => write!(f, "address out of range: {}", address),
            Fault::InvalidWriteTarget { address } => write!(f, "cannot write to literal {}", address),
            Fault::UnknownOpcode { opcode, .. } => write!(f, "unknown instruction {}", opcode),
            Fault::FetchOutOfBounds { address } => write!(f, "fetch out of bounds: {}", address),
            Fault::StackUnderflow => write!(f, "stack underflow"),
            Fault::DivisionByZeroModulus => write!(f, "modulus by zero"),
            Fault::InputClosed => write!(f, "input closed"),
            Fault::Io(kind) => write!(f, "i/o error: {:?}", kind),
        }
    }
}

impl error::Error for Fault {}

impl From<io::Error> for Fault {
    fn from(e: io::Error) -> Fault {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Fault::InputClosed,
            kind => Fault::Io(kind),
        }
    }
}

/// Error returned when an [Image](crate::image::Image) does not fit into memory.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    ImageTooLarge {
        /// The address at which loading was requested.
        base: usize,
        /// The number of words in the image.
        words: usize,
    },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::ImageTooLarge { base, words } => write!(
                f,
                "image of {} words does not fit in memory at base address {}",
                words, base
            ),
        }
    }
}

impl error::Error for LoadError {}

/// Error returned when a numeric argument or a patch cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    input: String,
    expected: &'static str,
}

impl ParseError {
    pub(crate) fn new(input: &str, expected: &'static str) -> ParseError {
        ParseError {
            input: input.to_string(),
            expected,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let end = self
            .input
            .char_indices()
            .nth(20)
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.input.len());

        write!(f, "expected {} at: {}", self.expected, &self.input[..end])
    }
}

impl error::Error for ParseError {}
