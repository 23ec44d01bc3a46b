//! Rendering instructions as text and listing whole address ranges.

use std::fmt;
use std::io::{self, Write};
use std::ops::Range;

use itertools::Itertools;

use crate::error::Fault;
use crate::instruction::{Instruction, Operand, OperandKind};

/// Text printed in place of an operand that is neither a literal nor a register.
pub const BAD_OPERAND: &str = "<BAD>";

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            OperandKind::Literal(value) => write!(f, "{}", value),
            OperandKind::Register(register) => write!(f, "{}", register),
            OperandKind::Invalid(_) => f.write_str(BAD_OPERAND),
        }
    }
}

fn operands(ins: &Instruction) -> Vec<Operand> {
    match *ins {
        Instruction::Halt | Instruction::Return | Instruction::NoOperation => vec![],

        Instruction::Push { src } | Instruction::Out { src } => vec![src],
        Instruction::Pop { dest } | Instruction::In { dest } => vec![dest],
        Instruction::Jump { target } | Instruction::Call { target } => vec![target],

        Instruction::Set { dest, src } | Instruction::Not { dest, src } => vec![dest, src],
        Instruction::JumpTrue { condition, target }
        | Instruction::JumpFalse { condition, target } => vec![condition, target],
        Instruction::ReadMemory { dest, address } => vec![dest, address],
        Instruction::WriteMemory { address, src } => vec![address, src],

        Instruction::Equal { dest, lhs, rhs }
        | Instruction::Greater { dest, lhs, rhs }
        | Instruction::Add { dest, lhs, rhs }
        | Instruction::Multiply { dest, lhs, rhs }
        | Instruction::Modulo { dest, lhs, rhs }
        | Instruction::And { dest, lhs, rhs }
        | Instruction::Or { dest, lhs, rhs } => vec![dest, lhs, rhs],
    }
}

/// Renders the mnemonic left aligned in a four column field, followed by the operands.
///
/// ```
/// use synacor::instruction::{Instruction, Operand};
///
/// let ins = Instruction::Add { dest: Operand(32768), lhs: Operand(32769), rhs: Operand(4) };
/// assert_eq!(ins.to_string(), "add  r0 r1 4");
/// assert_eq!(Instruction::Return.to_string(), "ret");
/// ```
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let operands = operands(self);

        if operands.is_empty() {
            write!(f, "{}", self.opcode())
        } else {
            write!(f, "{:<4} {}", self.opcode(), operands.iter().join(" "))
        }
    }
}

/// One line of a disassembly listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Address of the first word of the instruction.
    pub address: usize,

    /// The decoded instruction, or the reason decoding failed at this address.
    pub result: Result<Instruction, Fault>,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.result {
            Ok(ins) => write!(f, "{:05} {}", self.address, ins),
            Err(fault) => write!(f, "{:05} {}", self.address, fault),
        }
    }
}

/// Iterator decoding consecutive instructions over an address range.
///
/// After a successful decode the cursor moves past the instruction and its operands. After a
/// failure it moves forward by a single word.
#[derive(Debug, Clone)]
pub struct Disassembly<'m> {
    memory: &'m [u16],
    cursor: usize,
    end: usize,
}

/// Disassembles the instructions starting inside `range`.
///
/// The last instruction may extend past `range.end`. The range is clamped to the end of
/// `memory`.
pub fn disassemble(memory: &[u16], range: Range<usize>) -> Disassembly<'_> {
    Disassembly {
        memory,
        cursor: range.start,
        end: std::cmp::min(range.end, memory.len()),
    }
}

impl<'m> Iterator for Disassembly<'m> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if self.cursor >= self.end {
            return None;
        }

        let address = self.cursor;
        let result = Instruction::decode(self.memory, address);

        self.cursor += match &result {
            Ok(ins) => ins.size(),
            Err(_) => 1,
        };

        Some(Line { address, result })
    }
}

/// Writes one line per instruction in `range` to `out`.
///
/// # Returns
/// The number of lines written.
pub fn write_listing<W: Write>(memory: &[u16], range: Range<usize>, mut out: W) -> io::Result<usize> {
    let mut lines = 0;

    for line in disassemble(memory, range) {
        writeln!(out, "{}", line)?;
        lines += 1;
    }

    out.flush()?;

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_operands() {
        assert_eq!(Operand(0).to_string(), "0");
        assert_eq!(Operand(32767).to_string(), "32767");
        assert_eq!(Operand(32771).to_string(), "r3");
        assert_eq!(Operand(32776).to_string(), BAD_OPERAND);
    }

    #[test]
    fn test_render_instructions() {
        let cases = vec![
            (vec![0], "halt"),
            (vec![1, 32768, 4], "set  r0 4"),
            (vec![2, 32769], "push r1"),
            (vec![4, 32768, 32769, 65535], "eq   r0 r1 <BAD>"),
            (vec![10, 32768, 2, 3], "mult r0 2 3"),
            (vec![15, 32770, 1000], "rmem r2 1000"),
            (vec![19, 65], "out  65"),
            (vec![21], "noop"),
        ];

        for (words, text) in cases {
            let ins = Instruction::decode(&words, 0).unwrap();
            assert_eq!(ins.to_string(), text);
        }
    }

    #[test]
    fn test_disassemble_skips_operands() {
        let memory = [19, 65, 21, 0];
        let addresses: Vec<usize> = disassemble(&memory, 0..4).map(|l| l.address).collect();

        assert_eq!(addresses, vec![0, 2, 3]);
    }

    #[test]
    fn test_disassemble_recovers_from_errors() {
        let memory = [30, 19, 65, 9, 32768];
        let lines: Vec<String> = disassemble(&memory, 0..10).map(|l| l.to_string()).collect();

        assert_eq!(
            lines,
            vec![
                "00000 unknown instruction 30",
                "00001 out  65",
                "00003 fetch out of bounds: 5",
                "00004 unknown instruction 32768",
            ]
        );
    }

    #[test]
    fn test_write_listing() {
        let memory = [9, 32768, 32768, 1, 0];
        let mut out = Vec::new();

        assert_eq!(write_listing(&memory, 0..5, &mut out).unwrap(), 2);
        assert_eq!(String::from_utf8(out).unwrap(), "00000 add  r0 r0 1\n00004 halt\n");
    }
}
