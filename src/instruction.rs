//! Types for representing instructions and their parts, and the decoder that reads them from
//! memory.

use std::fmt;

use crate::error::Fault;

/// Number of distinct values a machine word can hold. All arithmetic is reduced modulo this.
pub const MODULUS: u32 = 32768;

/// Mask selecting the 15 significant bits of a machine word.
pub const WORD_MASK: u16 = 0x7FFF;

/// The first operand word that refers to a register instead of a literal.
pub const REGISTER_BASE: u16 = 32768;

/// Instructions of the Synacor architecture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpCode {
    /// Stops the execution.
    Halt,

    /// Copies the value of the second operand into a register.
    Set,

    /// Pushes the value of the operand onto the stack.
    Push,

    /// Removes the topmost value from the stack and writes it into a register.
    Pop,

    /// Writes 1 into a register if the two source operands are equal, otherwise 0.
    Equal,

    /// Writes 1 into a register if the first source operand is greater than the second,
    /// otherwise 0.
    Greater,

    /// Unconditionally changes the program counter.
    Jump,

    /// Changes the program counter if the first operand is nonzero.
    JumpTrue,

    /// Changes the program counter if the first operand is zero.
    JumpFalse,

    /// Adds two values modulo 32768.
    Add,

    /// Multiplies two values modulo 32768.
    Multiply,

    /// Stores the remainder of dividing the first source operand by the second.
    Modulo,

    /// Performs a binary and.
    And,

    /// Performs a binary or.
    Or,

    /// Performs a 15-bit binary not.
    Not,

    /// Reads a word from memory into a register.
    ReadMemory,

    /// Writes a value into a memory location.
    WriteMemory,

    /// Pushes the address of the next instruction onto the stack and jumps.
    Call,

    /// Pops an address from the stack and jumps to it.
    Return,

    /// Writes a character to the output device.
    Out,

    /// Reads a character from the input device.
    In,

    /// Does nothing besides advancing the program counter.
    NoOperation,
}

impl OpCode {
    pub fn from_word(word: u16) -> Option<OpCode> {
        Some(match word {
            0 => OpCode::Halt,
            1 => OpCode::Set,
            2 => OpCode::Push,
            3 => OpCode::Pop,
            4 => OpCode::Equal,
            5 => OpCode::Greater,
            6 => OpCode::Jump,
            7 => OpCode::JumpTrue,
            8 => OpCode::JumpFalse,
            9 => OpCode::Add,
            10 => OpCode::Multiply,
            11 => OpCode::Modulo,
            12 => OpCode::And,
            13 => OpCode::Or,
            14 => OpCode::Not,
            15 => OpCode::ReadMemory,
            16 => OpCode::WriteMemory,
            17 => OpCode::Call,
            18 => OpCode::Return,
            19 => OpCode::Out,
            20 => OpCode::In,
            21 => OpCode::NoOperation,
            _ => return None,
        })
    }

    /// Number of operand words following the opcode word.
    pub fn arity(&self) -> usize {
        match self {
            OpCode::Halt | OpCode::Return | OpCode::NoOperation => 0,

            OpCode::Push
            | OpCode::Pop
            | OpCode::Jump
            | OpCode::Call
            | OpCode::Out
            | OpCode::In => 1,

            OpCode::Set
            | OpCode::JumpTrue
            | OpCode::JumpFalse
            | OpCode::Not
            | OpCode::ReadMemory
            | OpCode::WriteMemory => 2,

            OpCode::Equal
            | OpCode::Greater
            | OpCode::Add
            | OpCode::Multiply
            | OpCode::Modulo
            | OpCode::And
            | OpCode::Or => 3,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Halt => "halt",
            OpCode::Set => "set",
            OpCode::Push => "push",
            OpCode::Pop => "pop",
            OpCode::Equal => "eq",
            OpCode::Greater => "gt",
            OpCode::Jump => "jmp",
            OpCode::JumpTrue => "jt",
            OpCode::JumpFalse => "jf",
            OpCode::Add => "add",
            OpCode::Multiply => "mult",
            OpCode::Modulo => "mod",
            OpCode::And => "and",
            OpCode::Or => "or",
            OpCode::Not => "not",
            OpCode::ReadMemory => "rmem",
            OpCode::WriteMemory => "wmem",
            OpCode::Call => "call",
            OpCode::Return => "ret",
            OpCode::Out => "out",
            OpCode::In => "in",
            OpCode::NoOperation => "noop",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Register {
    pub fn from_index(index: usize) -> Option<Register> {
        Some(match index {
            0 => Register::R0,
            1 => Register::R1,
            2 => Register::R2,
            3 => Register::R3,
            4 => Register::R4,
            5 => Register::R5,
            6 => Register::R6,
            7 => Register::R7,
            _ => return None,
        })
    }

    /// Returns the register named by a register reference in `32768..=32775`.
    pub fn from_address(address: u16) -> Option<Register> {
        address
            .checked_sub(REGISTER_BASE)
            .and_then(|index| Register::from_index(index as usize))
    }

    pub fn index(&self) -> usize {
        match self {
            Register::R0 => 0,
            Register::R1 => 1,
            Register::R2 => 2,
            Register::R3 => 3,
            Register::R4 => 4,
            Register::R5 => 5,
            Register::R6 => 6,
            Register::R7 => 7,
        }
    }

    /// The register reference word naming this register.
    pub fn address(&self) -> u16 {
        REGISTER_BASE + self.index() as u16
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}", self.index())
    }
}

/// A raw operand word as it appears in memory.
///
/// Operands are not interpreted when decoding. Whether an operand is read as a value, written
/// as a destination or used as a memory index depends on its role in the instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Operand(pub u16);

/// Classification of an operand word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperandKind {
    /// A value in `0..=32767` standing for itself.
    Literal(u16),

    /// A reference in `32768..=32775` to one of the registers.
    Register(Register),

    /// Anything above `32775`.
    Invalid(u16),
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        if self.0 < REGISTER_BASE {
            OperandKind::Literal(self.0)
        } else {
            match Register::from_address(self.0) {
                Some(register) => OperandKind::Register(register),
                None => OperandKind::Invalid(self.0),
            }
        }
    }
}

/// A decoded instruction with its raw operands.
///
/// `dest` operands are written through a register reference, `target` operands are jump
/// destinations and every other operand is a value source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Halt,
    Set { dest: Operand, src: Operand },
    Push { src: Operand },
    Pop { dest: Operand },
    Equal { dest: Operand, lhs: Operand, rhs: Operand },
    Greater { dest: Operand, lhs: Operand, rhs: Operand },
    Jump { target: Operand },
    JumpTrue { condition: Operand, target: Operand },
    JumpFalse { condition: Operand, target: Operand },
    Add { dest: Operand, lhs: Operand, rhs: Operand },
    Multiply { dest: Operand, lhs: Operand, rhs: Operand },
    Modulo { dest: Operand, lhs: Operand, rhs: Operand },
    And { dest: Operand, lhs: Operand, rhs: Operand },
    Or { dest: Operand, lhs: Operand, rhs: Operand },
    Not { dest: Operand, src: Operand },
    /// `dest` is a register, `address` is the value used as the memory index.
    ReadMemory { dest: Operand, address: Operand },
    /// Both operands are values: the memory index and the word stored there.
    WriteMemory { address: Operand, src: Operand },
    Call { target: Operand },
    Return,
    Out { src: Operand },
    In { dest: Operand },
    NoOperation,
}

impl Instruction {
    /// Decodes the instruction starting at `address`.
    ///
    /// Reads the opcode word, then exactly as many operand words as the opcode requires.
    ///
    /// # Errors
    /// - [Fault::UnknownOpcode] if the first word is not an opcode.
    /// - [Fault::FetchOutOfBounds] if the opcode or one of its operands lies past the end of
    ///   `memory`.
    pub fn decode(memory: &[u16], address: usize) -> Result<Instruction, Fault> {
        let word = *memory
            .get(address)
            .ok_or(Fault::FetchOutOfBounds { address })?;

        let opcode = OpCode::from_word(word).ok_or(Fault::UnknownOpcode {
            opcode: word,
            address,
        })?;

        let start = address + 1;
        let end = start + opcode.arity();

        let operands = memory.get(start..end).ok_or(Fault::FetchOutOfBounds {
            address: std::cmp::max(start, memory.len()),
        })?;

        Ok(Instruction::from_parts(opcode, operands))
    }

    /// Builds an instruction from an opcode and its raw operands.
    ///
    /// `operands` must hold at least [OpCode::arity] words; extra words are ignored.
    fn from_parts(opcode: OpCode, operands: &[u16]) -> Instruction {
        let op = |i: usize| Operand(operands[i]);

        match opcode {
            OpCode::Halt => Instruction::Halt,
            OpCode::Set => Instruction::Set { dest: op(0), src: op(1) },
            OpCode::Push => Instruction::Push { src: op(0) },
            OpCode::Pop => Instruction::Pop { dest: op(0) },
            OpCode::Equal => Instruction::Equal { dest: op(0), lhs: op(1), rhs: op(2) },
            OpCode::Greater => Instruction::Greater { dest: op(0), lhs: op(1), rhs: op(2) },
            OpCode::Jump => Instruction::Jump { target: op(0) },
            OpCode::JumpTrue => Instruction::JumpTrue { condition: op(0), target: op(1) },
            OpCode::JumpFalse => Instruction::JumpFalse { condition: op(0), target: op(1) },
            OpCode::Add => Instruction::Add { dest: op(0), lhs: op(1), rhs: op(2) },
            OpCode::Multiply => Instruction::Multiply { dest: op(0), lhs: op(1), rhs: op(2) },
            OpCode::Modulo => Instruction::Modulo { dest: op(0), lhs: op(1), rhs: op(2) },
            OpCode::And => Instruction::And { dest: op(0), lhs: op(1), rhs: op(2) },
            OpCode::Or => Instruction::Or { dest: op(0), lhs: op(1), rhs: op(2) },
            OpCode::Not => Instruction::Not { dest: op(0), src: op(1) },
            OpCode::ReadMemory => Instruction::ReadMemory { dest: op(0), address: op(1) },
            OpCode::WriteMemory => Instruction::WriteMemory { address: op(0), src: op(1) },
            OpCode::Call => Instruction::Call { target: op(0) },
            OpCode::Return => Instruction::Return,
            OpCode::Out => Instruction::Out { src: op(0) },
            OpCode::In => Instruction::In { dest: op(0) },
            OpCode::NoOperation => Instruction::NoOperation,
        }
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            Instruction::Halt => OpCode::Halt,
            Instruction::Set { .. } => OpCode::Set,
            Instruction::Push { .. } => OpCode::Push,
            Instruction::Pop { .. } => OpCode::Pop,
            Instruction::Equal { .. } => OpCode::Equal,
            Instruction::Greater { .. } => OpCode::Greater,
            Instruction::Jump { .. } => OpCode::Jump,
            Instruction::JumpTrue { .. } => OpCode::JumpTrue,
            Instruction::JumpFalse { .. } => OpCode::JumpFalse,
            Instruction::Add { .. } => OpCode::Add,
            Instruction::Multiply { .. } => OpCode::Multiply,
            Instruction::Modulo { .. } => OpCode::Modulo,
            Instruction::And { .. } => OpCode::And,
            Instruction::Or { .. } => OpCode::Or,
            Instruction::Not { .. } => OpCode::Not,
            Instruction::ReadMemory { .. } => OpCode::ReadMemory,
            Instruction::WriteMemory { .. } => OpCode::WriteMemory,
            Instruction::Call { .. } => OpCode::Call,
            Instruction::Return => OpCode::Return,
            Instruction::Out { .. } => OpCode::Out,
            Instruction::In { .. } => OpCode::In,
            Instruction::NoOperation => OpCode::NoOperation,
        }
    }

    /// The number of words the instruction occupies in memory.
    pub fn size(&self) -> usize {
        1 + self.opcode().arity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_table() {
        let mnemonics: Vec<&str> = (0..22)
            .map(|word| OpCode::from_word(word).expect("opcode in table").mnemonic())
            .collect();

        assert_eq!(mnemonics.len(), 22);
        assert_eq!(mnemonics[0], "halt");
        assert_eq!(mnemonics[21], "noop");

        for (i, mnemonic) in mnemonics.iter().enumerate() {
            assert!(!mnemonics[..i].contains(mnemonic), "duplicate mnemonic {}", mnemonic);
        }

        assert_eq!(OpCode::from_word(22), None);
        assert_eq!(OpCode::from_word(0xFFFF), None);
    }

    #[test]
    fn test_operand_kinds() {
        assert_eq!(Operand(0).kind(), OperandKind::Literal(0));
        assert_eq!(Operand(32767).kind(), OperandKind::Literal(32767));
        assert_eq!(Operand(32768).kind(), OperandKind::Register(Register::R0));
        assert_eq!(Operand(32775).kind(), OperandKind::Register(Register::R7));
        assert_eq!(Operand(32776).kind(), OperandKind::Invalid(32776));
    }

    #[test]
    fn test_decode_noop_at_end_of_memory() {
        let memory = [21];
        assert_eq!(Instruction::decode(&memory, 0), Ok(Instruction::NoOperation));
    }

    #[test]
    fn test_decode_truncated_operands() {
        let memory = [4, 32768, 1];
        assert_eq!(
            Instruction::decode(&memory, 0),
            Err(Fault::FetchOutOfBounds { address: 3 })
        );
    }

    #[test]
    fn test_decode_unknown_opcode() {
        let memory = [0, 22];
        assert_eq!(
            Instruction::decode(&memory, 1),
            Err(Fault::UnknownOpcode { opcode: 22, address: 1 })
        );
    }

    #[test]
    fn test_decode_reads_arity_words() {
        let memory = [9, 32768, 32769, 7, 0];
        let ins = Instruction::decode(&memory, 0).unwrap();

        assert_eq!(
            ins,
            Instruction::Add {
                dest: Operand(32768),
                lhs: Operand(32769),
                rhs: Operand(7),
            }
        );
        assert_eq!(ins.size(), 4);
        assert_eq!(Instruction::decode(&memory, 4), Ok(Instruction::Halt));
    }
}
