//! Line buffered character input.

use std::io::{self, BufRead};

/// Character code of the line terminator delivered after every line.
pub const NEWLINE: u16 = b'\n' as u16;

/// Delivers the characters of a line oriented source one code at a time.
///
/// A whole line is read from the underlying reader only once every character of the previous
/// line and its terminator have been handed out, so each line of input produces
/// `len(line) + 1` codes. Reading blocks until the reader can supply a full line.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: R,
    buffer: Vec<u16>,
    /// Index of the next code in `buffer`. `buffer.len()` means the terminator is pending,
    /// anything past it means a new line has to be read.
    cursor: usize,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> LineInput<R> {
        LineInput {
            reader,
            buffer: Vec::new(),
            cursor: 1,
        }
    }

    /// Returns the next character code, reading a new line if the buffer is exhausted.
    ///
    /// # Errors
    /// [io::ErrorKind::UnexpectedEof] if the reader has no more lines, or any error of the
    /// underlying reader.
    pub fn next_code(&mut self) -> io::Result<u16> {
        if self.cursor < self.buffer.len() {
            let code = self.buffer[self.cursor];
            self.cursor += 1;
            return Ok(code);
        }

        if self.cursor == self.buffer.len() {
            self.cursor += 1;
            return Ok(NEWLINE);
        }

        let mut line = Vec::new();

        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended while waiting for a line",
            ));
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }

        self.buffer = String::from_utf8_lossy(&line).encode_utf16().collect();
        self.cursor = 0;

        self.next_code()
    }

    /// True if the next call to [next_code](LineInput::next_code) will read from the reader.
    pub fn needs_line(&self) -> bool {
        self.cursor > self.buffer.len()
    }
}
