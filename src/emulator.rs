//! [Emulator] for executing Synacor programs.

use std::io::{self, BufReader, Cursor, Stdin, Write};

use slog::{debug, o, trace, warn, Discard, Logger};

use crate::error::Fault;
use crate::input::LineInput;
use crate::instruction::{Instruction, Operand, OperandKind, Register, MODULUS, WORD_MASK};
use crate::memory::{Memory, Patch};

/// Contains the execution environment of the processor.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// The Program Counter stores the address of the next instruction to be executed.
    pub pc: u16,

    /// Array containing values for all the eight registers.
    pub r: [u16; 8],

    /// The unbounded stack shared by `push`/`pop` and `call`/`ret`.
    pub stack: Vec<u16>,
}

impl Context {
    /// Resolves an operand used as a value.
    ///
    /// Literals stand for themselves and register references for the register's content.
    pub fn resolve_read(&self, operand: Operand) -> Result<u16, Fault> {
        match operand.kind() {
            OperandKind::Literal(value) => Ok(value),
            OperandKind::Register(register) => Ok(self.register(register)),
            OperandKind::Invalid(address) => Err(Fault::AddressOutOfRange { address }),
        }
    }

    /// Resolves an operand used as a destination. Only register references are writable.
    pub fn resolve_write(&self, operand: Operand) -> Result<Register, Fault> {
        match operand.kind() {
            OperandKind::Register(register) => Ok(register),
            OperandKind::Literal(address) => Err(Fault::InvalidWriteTarget { address }),
            OperandKind::Invalid(address) => Err(Fault::AddressOutOfRange { address }),
        }
    }

    pub fn register(&self, register: Register) -> u16 {
        self.r[register.index()]
    }

    /// Stores `value` modulo 32768 into `register`.
    pub fn set_register(&mut self, register: Register, value: u16) {
        self.r[register.index()] = value & WORD_MASK;
    }
}

/// Execution state of an [Emulator].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted,
}

/// What a `ret` instruction does when the stack is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPolicy {
    /// Fault with [Fault::StackUnderflow], like `pop` does.
    Fault,
    /// Treat the return as a `halt`.
    Halt,
}

/// Tunable behaviour of the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub empty_return: ReturnPolicy,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            empty_return: ReturnPolicy::Fault,
        }
    }
}

/// Interface to the input and output devices.
pub trait InputOutput {
    /// Called when an IN instruction is executed. May block until input is available.
    ///
    /// # Returns
    /// A character code, or an error if no more input can be produced.
    fn input(&mut self) -> io::Result<u16>;

    /// Called when an OUT instruction is executed.
    ///
    /// # Parameters
    /// - `code`: The character code to print.
    fn output(&mut self, code: u16) -> io::Result<()>;
}

impl<T: InputOutput + ?Sized> InputOutput for &mut T {
    fn input(&mut self) -> io::Result<u16> {
        (**self).input()
    }

    fn output(&mut self, code: u16) -> io::Result<()> {
        (**self).output(code)
    }
}

/// Utility struct for implementing methods in the context of emulating a single instruction.
struct InstructionEmulationContext<'e, 'i, IO> {
    /// The emulator in whose context the instruction is being emulated.
    emulator: &'e mut Emulator<IO>,

    /// The instruction that we are currently emulating.
    instruction: &'i Instruction,
}

impl<'e, 'i, IO> InstructionEmulationContext<'e, 'i, IO>
where
    IO: InputOutput,
{
    fn read(&self, operand: Operand) -> Result<u16, Fault> {
        self.emulator.context.resolve_read(operand)
    }

    fn write(&mut self, operand: Operand, value: u16) -> Result<(), Fault> {
        let register = self.emulator.context.resolve_write(operand)?;
        self.emulator.context.set_register(register, value);
        Ok(())
    }

    /// Applies `op` to the values of `lhs` and `rhs` and stores the result into `dest`.
    fn binary<F>(&mut self, dest: Operand, lhs: Operand, rhs: Operand, op: F) -> Result<(), Fault>
    where
        F: FnOnce(u32, u32) -> Result<u32, Fault>,
    {
        let lhs = self.read(lhs)? as u32;
        let rhs = self.read(rhs)? as u32;
        let result = op(lhs, rhs)? % MODULUS;

        self.write(dest, result as u16)
    }

    fn jump(&mut self, target: Operand) -> Result<(), Fault> {
        self.emulator.context.pc = self.read(target)?;
        Ok(())
    }

    fn pop_stack(&mut self) -> Result<u16, Fault> {
        self.emulator.context.stack.pop().ok_or(Fault::StackUnderflow)
    }

    /// Execute the instruction.
    ///
    /// The program counter must already point past the instruction.
    fn emulate(&mut self) -> Result<(), Fault> {
        match *self.instruction {
            Instruction::Halt => self.emulator.state = State::Halted,

            Instruction::Set { dest, src } => {
                let value = self.read(src)?;
                self.write(dest, value)?;
            }

            Instruction::Push { src } => {
                let value = self.read(src)?;
                self.emulator.context.stack.push(value);
            }

            Instruction::Pop { dest } => {
                let register = self.emulator.context.resolve_write(dest)?;
                let value = self.pop_stack()?;
                self.emulator.context.set_register(register, value);
            }

            Instruction::Equal { dest, lhs, rhs } => {
                self.binary(dest, lhs, rhs, |a, b| Ok(u32::from(a == b)))?
            }
            Instruction::Greater { dest, lhs, rhs } => {
                self.binary(dest, lhs, rhs, |a, b| Ok(u32::from(a > b)))?
            }

            Instruction::Jump { target } => self.jump(target)?,

            Instruction::JumpTrue { condition, target } => {
                if self.read(condition)? != 0 {
                    self.jump(target)?;
                }
            }

            Instruction::JumpFalse { condition, target } => {
                if self.read(condition)? == 0 {
                    self.jump(target)?;
                }
            }

            Instruction::Add { dest, lhs, rhs } => self.binary(dest, lhs, rhs, |a, b| Ok(a + b))?,
            Instruction::Multiply { dest, lhs, rhs } => {
                self.binary(dest, lhs, rhs, |a, b| Ok(a * b))?
            }
            Instruction::Modulo { dest, lhs, rhs } => self.binary(dest, lhs, rhs, |a, b| {
                a.checked_rem(b).ok_or(Fault::DivisionByZeroModulus)
            })?,
            Instruction::And { dest, lhs, rhs } => self.binary(dest, lhs, rhs, |a, b| Ok(a & b))?,
            Instruction::Or { dest, lhs, rhs } => self.binary(dest, lhs, rhs, |a, b| Ok(a | b))?,

            Instruction::Not { dest, src } => {
                let value = self.read(src)?;
                self.write(dest, !value & WORD_MASK)?;
            }

            Instruction::ReadMemory { dest, address } => {
                let index = self.read(address)?;
                let value = self.emulator.memory.read(index)?;
                self.write(dest, value)?;
            }

            Instruction::WriteMemory { address, src } => {
                let index = self.read(address)?;
                let value = self.read(src)?;
                self.emulator.memory.write(index, value)?;
            }

            Instruction::Call { target } => {
                let target = self.read(target)?;
                let pc = self.emulator.context.pc;
                self.emulator.context.stack.push(pc);
                self.emulator.context.pc = target;
            }

            Instruction::Return => match self.emulator.context.stack.pop() {
                Some(address) => self.emulator.context.pc = address,
                None => match self.emulator.config.empty_return {
                    ReturnPolicy::Fault => return Err(Fault::StackUnderflow),
                    ReturnPolicy::Halt => self.emulator.state = State::Halted,
                },
            },

            Instruction::Out { src } => {
                let code = self.read(src)?;
                self.emulator.io.output(code)?;
            }

            Instruction::In { dest } => {
                let register = self.emulator.context.resolve_write(dest)?;
                let code = self.emulator.io.input()?;
                self.emulator.context.set_register(register, code);
            }

            Instruction::NoOperation => (),
        }

        Ok(())
    }
}

/// The emulator contains all neccessary context for executing a program
/// and an interface for doing IO.
#[derive(Debug)]
pub struct Emulator<IO> {
    /// The memory of the emulated machine.
    /// Contains all the instructions and data required by the program.
    pub memory: Memory,

    /// The execution context, which includes the registers and the stack.
    pub context: Context,

    /// Interface for doing IO operations.
    pub io: IO,

    /// Whether the program is still running.
    pub state: State,

    pub config: Config,

    logger: Logger,
}

impl<IO> Emulator<IO>
where
    IO: InputOutput,
{
    /// Create a new emulator.
    ///
    /// # Parameters
    /// - `memory`: A [Memory] object which has the program loaded.
    /// - `io`: An [IO handler](InputOutput).
    ///
    /// # Returns
    /// A new [Emulator] instance, running from address 0.
    pub fn new(memory: Memory, io: IO) -> Emulator<IO> {
        Emulator::with_logger(memory, io, None::<Logger>)
    }

    pub fn with_logger<L>(memory: Memory, io: IO, logger: L) -> Emulator<IO>
    where
        L: Into<Option<Logger>>,
    {
        let mut emulator = Emulator {
            memory,
            context: Context::default(),
            io,
            state: State::Running,
            config: Config::default(),
            logger: Logger::root(Discard, o!()),
        };

        emulator.set_logger(logger);
        emulator
    }

    pub fn set_logger<L>(&mut self, logger: L)
    where
        L: Into<Option<Logger>>,
    {
        self.logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "emulation"));
    }

    pub fn with_config(mut self, config: Config) -> Emulator<IO> {
        self.config = config;
        self
    }

    /// Applies `patches` in order.
    ///
    /// Memory cells receive the value verbatim, registers receive it modulo 32768.
    ///
    /// # Errors
    /// [Fault::AddressOutOfRange] for a patch addressing neither memory nor a register. The
    /// patches before it have been applied.
    pub fn patch(&mut self, patches: &[Patch]) -> Result<(), Fault> {
        for patch in patches {
            match Operand(patch.address).kind() {
                OperandKind::Literal(index) => self.memory.write(index, patch.value)?,
                OperandKind::Register(register) => {
                    self.context.set_register(register, patch.value)
                }
                OperandKind::Invalid(address) => return Err(Fault::AddressOutOfRange { address }),
            }

            debug!(self.logger, "apply patch"; "address" => patch.address, "value" => patch.value);
        }

        Ok(())
    }

    /// Decodes the instruction at the address pointed by the Program Counter register.
    pub fn get_current_instruction(&self) -> Result<Instruction, Fault> {
        Instruction::decode(self.memory.words(), self.context.pc as usize)
    }

    /// Executes a single instruction.
    ///
    /// Does not advance the `PC` register or do anything else related to the instruction
    /// fetching.
    pub fn emulate_instruction(&mut self, ins: &Instruction) -> Result<(), Fault> {
        let mut ctx = InstructionEmulationContext {
            emulator: self,
            instruction: ins,
        };

        ctx.emulate()
    }

    fn execute_next(&mut self) -> Result<(), Fault> {
        let ins = self.get_current_instruction()?;
        let pc = self.context.pc;

        trace!(self.logger, "execute"; "pc" => pc, "instruction" => %ins);

        self.context.pc = pc + ins.size() as u16;
        self.emulate_instruction(&ins)
    }

    /// Fetches the next instruction, advances the program counter past it and executes it.
    ///
    /// Does nothing once the emulator has halted or faulted.
    ///
    /// # Returns
    /// The state after the instruction.
    ///
    /// # Errors
    /// The fault that stopped the program. The emulator is left [Faulted](State::Faulted).
    pub fn step(&mut self) -> Result<State, Fault> {
        if self.state != State::Running {
            return Ok(self.state);
        }

        let pc = self.context.pc;

        match self.execute_next() {
            Ok(()) => {
                if self.state == State::Halted {
                    debug!(self.logger, "halted"; "pc" => pc);
                }

                Ok(self.state)
            }
            Err(fault) => {
                warn!(self.logger, "fault"; "pc" => pc, "fault" => %fault);
                self.state = State::Faulted;
                Err(fault)
            }
        }
    }

    /// Executes the program until it halts or faults.
    pub fn run(&mut self) -> Result<State, Fault> {
        while self.state == State::Running {
            self.step()?;
        }

        Ok(self.state)
    }
}

/// An IO handler for testing purposes.
///
/// Reads input lines from a pre-determined buffer and records printed character codes.
#[derive(Debug)]
pub struct TestIo {
    input: LineInput<Cursor<Vec<u8>>>,
    output_buffer: Vec<u16>,
}

impl Default for TestIo {
    fn default() -> TestIo {
        TestIo::new()
    }
}

impl TestIo {
    pub fn new() -> TestIo {
        TestIo::with_input("")
    }

    pub fn with_input(input: &str) -> TestIo {
        TestIo {
            input: LineInput::new(Cursor::new(input.as_bytes().to_vec())),
            output_buffer: Vec::new(),
        }
    }

    pub fn output(&self) -> &[u16] {
        &self.output_buffer[..]
    }

    pub fn output_string(&self) -> String {
        String::from_utf16_lossy(&self.output_buffer)
    }

    pub fn into_output(self) -> Vec<u16> {
        self.output_buffer
    }
}

impl InputOutput for TestIo {
    fn input(&mut self) -> io::Result<u16> {
        self.input.next_code()
    }

    fn output(&mut self, code: u16) -> io::Result<()> {
        self.output_buffer.push(code);
        Ok(())
    }
}

/// An IO handler connected to the terminal.
///
/// Input is read from the standard input one line at a time. Output characters are written to
/// the standard output, which is flushed whenever the program waits for input.
#[derive(Debug)]
pub struct StdIo {
    input: LineInput<BufReader<Stdin>>,
}

impl Default for StdIo {
    fn default() -> StdIo {
        StdIo::new()
    }
}

impl StdIo {
    pub fn new() -> StdIo {
        StdIo {
            input: LineInput::new(BufReader::new(io::stdin())),
        }
    }
}

impl InputOutput for StdIo {
    fn input(&mut self) -> io::Result<u16> {
        if self.input.needs_line() {
            io::stdout().flush()?;
        }

        self.input.next_code()
    }

    fn output(&mut self, code: u16) -> io::Result<()> {
        let ch = std::char::from_u32(code as u32).unwrap_or(std::char::REPLACEMENT_CHARACTER);
        let mut buf = [0; 4];

        io::stdout().write_all(ch.encode_utf8(&mut buf).as_bytes())
    }
}
