//! The data memory of the machine and pre-run patches.

use std::fmt;
use std::str::FromStr;

use crate::error::{Fault, LoadError, ParseError};
use crate::image::Image;
use crate::parsing::parse_pair;

/// Number of words in memory.
pub const MEMORY_SIZE: usize = 32768;

/// Flat word-addressed memory holding both the program and its data.
///
/// Memory is only ever indexed directly. Operand resolution into literals and registers is
/// handled by the [Context](crate::emulator::Context).
#[derive(Clone)]
pub struct Memory {
    words: Vec<u16>,
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let used = self
            .words
            .iter()
            .rposition(|word| *word != 0)
            .map(|last| last + 1)
            .unwrap_or(0);

        write!(f, "Memory {{ size: {}, used: {} }}", self.words.len(), used)
    }
}

impl Memory {
    /// Creates zeroed memory.
    pub fn new() -> Memory {
        Memory {
            words: vec![0; MEMORY_SIZE],
        }
    }

    /// Creates memory with `image` loaded at address 0.
    pub fn with_image(image: &Image) -> Result<Memory, LoadError> {
        let mut memory = Memory::new();
        memory.load(0, image)?;
        Ok(memory)
    }

    /// Copies the words of `image` into memory starting at `base`.
    ///
    /// # Errors
    /// [LoadError::ImageTooLarge] if the image does not fit. Memory is left untouched.
    pub fn load(&mut self, base: usize, image: &Image) -> Result<(), LoadError> {
        let end = base
            .checked_add(image.len())
            .filter(|end| *end <= MEMORY_SIZE)
            .ok_or(LoadError::ImageTooLarge {
                base,
                words: image.len(),
            })?;

        self.words[base..end].copy_from_slice(&image.words);

        Ok(())
    }

    /// Reads the word at `index`.
    pub fn read(&self, index: u16) -> Result<u16, Fault> {
        self.words
            .get(index as usize)
            .copied()
            .ok_or(Fault::AddressOutOfRange { address: index })
    }

    /// Overwrites the word at `index`.
    pub fn write(&mut self, index: u16, value: u16) -> Result<(), Fault> {
        match self.words.get_mut(index as usize) {
            Some(word) => {
                *word = value;
                Ok(())
            }
            None => Err(Fault::AddressOutOfRange { address: index }),
        }
    }

    /// All memory words, for decoding.
    pub fn words(&self) -> &[u16] {
        &self.words[..]
    }
}

/// A direct write into memory or a register applied before the program starts.
///
/// The address uses the same space as instruction operands: `0..=32767` is a memory cell,
/// `32768..=32775` is a register. Memory cells receive the value verbatim, so a patch can
/// write instruction words including register references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub address: u16,
    pub value: u16,
}

impl Patch {
    pub fn new(address: u16, value: u16) -> Patch {
        Patch { address, value }
    }
}

impl FromStr for Patch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Patch, ParseError> {
        let (address, value) = parse_pair(s)?;
        Ok(Patch { address, value })
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=0x{:04x}", self.address, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_at_base() {
        let mut memory = Memory::new();
        memory.load(100, &Image::from_words(vec![1, 2, 3])).unwrap();

        assert_eq!(memory.read(99), Ok(0));
        assert_eq!(memory.read(100), Ok(1));
        assert_eq!(memory.read(102), Ok(3));
    }

    #[test]
    fn test_load_too_large() {
        let mut memory = Memory::new();
        let image = Image::from_words(vec![21; 4]);

        assert_eq!(
            memory.load(MEMORY_SIZE - 3, &image),
            Err(LoadError::ImageTooLarge { base: MEMORY_SIZE - 3, words: 4 })
        );
        assert!(memory.load(MEMORY_SIZE - 4, &image).is_ok());
    }

    #[test]
    fn test_read_write_bounds() {
        let mut memory = Memory::new();

        assert_eq!(memory.write(32767, 0xFFFF), Ok(()));
        assert_eq!(memory.read(32767), Ok(0xFFFF));
        assert_eq!(memory.write(32768, 1), Err(Fault::AddressOutOfRange { address: 32768 }));
        assert_eq!(memory.read(40000), Err(Fault::AddressOutOfRange { address: 40000 }));
    }

    #[test]
    fn test_patch_from_str() {
        assert_eq!("522=0x8007".parse::<Patch>(), Ok(Patch::new(522, 0x8007)));
        assert!("522:1".parse::<Patch>().is_err());
    }
}
