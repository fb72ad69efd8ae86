//! Core virtual machine implementation.
//!
//! A [`Machine`] owns a linear memory of `i64` cells, a program counter, a
//! relative base and an input queue. Each [`step`](Machine::step) decodes one
//! instruction, resolves its operands, executes it and optionally yields one
//! output value. Arithmetic uses wrapping semantics so no program can panic
//! the host.
//!
//! # Lifecycle
//!
//! ```text
//! Ready ──step/run──▶ Running ──HALT──▶ Halted
//!                        │
//!                        └──error──▶ Faulted
//! ```
//!
//! Halted and Faulted are terminal. Running a halted machine returns no
//! output; stepping a faulted machine returns the original fault again.

mod config;
mod io;
mod memory;
mod profile;

pub use config::{DEFAULT_MEMORY_CAPACITY, MEMORY_ENV_VAR, MachineConfig};
pub use io::{Constant, InputFn, InputSource, NoInput};
pub use profile::ExecutionProfile;

use crate::trace;
use crate::virtual_machine::disassembler::disassemble_one;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Instruction;
use crate::virtual_machine::operand::{AddressingMode, MAX_PARAMS, decode};
use crate::virtual_machine::program::Program;
use memory::Memory;
use std::collections::VecDeque;
use std::str::FromStr;

/// Execution state of a [`Machine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Constructed, no instruction executed yet.
    Ready,
    /// At least one instruction executed, not halted.
    Running,
    /// Executed HALT. Terminal.
    Halted,
    /// Raised an error. Terminal.
    Faulted,
}

/// One decoded instruction with mode-resolved operands.
///
/// Produced by [`Machine::fetch`] and consumed immediately by [`Machine::exec`].
#[derive(Clone, Copy, Debug)]
struct Decoded {
    instr: Instruction,
    /// Address of the opcode cell.
    pc: usize,
    /// Read operands hold values; a write operand holds the target address.
    params: [i64; MAX_PARAMS],
    /// Input consumed by an input instruction.
    input: Option<i64>,
}

/// Intcode virtual machine.
pub struct Machine {
    /// Program and scratch memory.
    memory: Memory,
    /// Address of the next opcode cell.
    pc: usize,
    /// Offset applied to relative-mode operands.
    relative_base: i64,
    status: Status,
    /// Error that moved the machine to [`Status::Faulted`].
    fault: Option<VMError>,
    /// Pending input values, consumed front first.
    inputs: VecDeque<i64>,
    /// Executed instruction counts.
    profile: ExecutionProfile,
}

impl Machine {
    /// Creates a machine for `program` with the default configuration.
    pub fn new(program: &Program) -> Self {
        Self::with_config(program, &MachineConfig::default())
    }

    /// Creates a machine for `program` using `config`.
    pub fn with_config(program: &Program, config: &MachineConfig) -> Self {
        Self {
            memory: Memory::new(program.cells(), config.memory_capacity),
            pc: 0,
            relative_base: 0,
            status: Status::Ready,
            fault: None,
            inputs: VecDeque::new(),
            profile: ExecutionProfile::new(),
        }
    }

    /// Returns the current execution state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns `true` once HALT has executed.
    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    /// Returns the fault that stopped the machine, if any.
    pub fn fault(&self) -> Option<&VMError> {
        self.fault.as_ref()
    }

    /// Returns the address of the next instruction.
    pub fn program_counter(&self) -> usize {
        self.pc
    }

    /// Returns the current relative base.
    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    /// Reads one memory cell.
    pub fn peek(&self, address: usize) -> Result<i64, VMError> {
        let address = i64::try_from(address).map_err(|_| VMError::AddressOutOfRange {
            address: i64::MAX,
            capacity: self.memory.len(),
        })?;
        self.memory.get(address)
    }

    /// Returns the whole allocated memory.
    pub fn memory(&self) -> &[i64] {
        self.memory.as_slice()
    }

    /// Returns the number of allocated memory cells.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Returns the number of queued, not yet consumed inputs.
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Appends values to the input queue.
    pub fn push_inputs<I: IntoIterator<Item = i64>>(&mut self, inputs: I) {
        self.inputs.extend(inputs);
    }

    /// Returns executed instruction counts by category.
    pub fn profile(&self) -> &ExecutionProfile {
        &self.profile
    }

    /// Returns the number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.profile.total()
    }

    /// Executes one instruction using only the internal input queue.
    ///
    /// Returns the produced output, if the instruction was an output.
    pub fn step(&mut self) -> Result<Option<i64>, VMError> {
        self.step_with(&mut NoInput)
    }

    /// Executes one instruction, asking `source` for input once the queue is empty.
    pub fn step_with<S: InputSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<i64>, VMError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if self.status == Status::Halted {
            return Ok(None);
        }
        self.status = Status::Running;

        let result = self.fetch(source).and_then(|decoded| self.exec(decoded));
        if let Err(e) = &result {
            self.status = Status::Faulted;
            self.fault = Some(e.clone());
        }
        result
    }

    /// Appends `inputs` and runs until halt, or until one output when
    /// `stop_after_first_output` is set.
    ///
    /// Returns the outputs produced during this call.
    pub fn run<I: IntoIterator<Item = i64>>(
        &mut self,
        inputs: I,
        stop_after_first_output: bool,
    ) -> Result<Vec<i64>, VMError> {
        self.run_until(inputs, stop_after_first_output.then_some(1))
    }

    /// Appends `inputs` and runs until halt or until `max_outputs` outputs.
    pub fn run_until<I: IntoIterator<Item = i64>>(
        &mut self,
        inputs: I,
        max_outputs: Option<usize>,
    ) -> Result<Vec<i64>, VMError> {
        self.inputs.extend(inputs);
        self.run_with(&mut NoInput, max_outputs)
    }

    /// Runs until halt or until `max_outputs` outputs, pulling input from
    /// `source` whenever the queue is empty.
    pub fn run_with<S: InputSource + ?Sized>(
        &mut self,
        source: &mut S,
        max_outputs: Option<usize>,
    ) -> Result<Vec<i64>, VMError> {
        let mut outputs = Vec::new();
        while !self.is_halted() && max_outputs.is_none_or(|n| outputs.len() < n) {
            if let Some(value) = self.step_with(source)? {
                outputs.push(value);
            }
        }
        Ok(outputs)
    }

    /// Decodes the instruction at the program counter and advances past it.
    fn fetch<S: InputSource + ?Sized>(&mut self, source: &mut S) -> Result<Decoded, VMError> {
        let pc = self.pc;
        let (instr, modes) = decode(self.memory.get(pc as i64)?)?;

        trace!(
            "{} rb={}",
            disassemble_one(self.memory.as_slice(), pc),
            self.relative_base
        );

        let count = instr.param_count();
        let mut params = [0i64; MAX_PARAMS];
        for (i, (slot, mode)) in params.iter_mut().zip(modes).take(count).enumerate() {
            let raw = self.memory.get((pc + 1 + i) as i64)?;
            *slot = if instr.writes() && i == count - 1 {
                self.write_address(instr, pc, mode, raw)?
            } else {
                self.read_operand(mode, raw)?
            };
        }

        let input = if instr.reads_input() {
            let value = self
                .inputs
                .pop_front()
                .or_else(|| source.next_input())
                .ok_or(VMError::InputExhausted)?;
            Some(value)
        } else {
            None
        };

        self.pc = pc + 1 + count;
        Ok(Decoded {
            instr,
            pc,
            params,
            input,
        })
    }

    /// Resolves a read operand to its value.
    fn read_operand(&self, mode: AddressingMode, raw: i64) -> Result<i64, VMError> {
        match mode {
            AddressingMode::Position => self.memory.get(raw),
            AddressingMode::Immediate => Ok(raw),
            AddressingMode::Relative => self.memory.get(self.relative_base.wrapping_add(raw)),
        }
    }

    /// Resolves a write operand to its target address.
    fn write_address(
        &self,
        instr: Instruction,
        pc: usize,
        mode: AddressingMode,
        raw: i64,
    ) -> Result<i64, VMError> {
        match mode {
            AddressingMode::Position => Ok(raw),
            AddressingMode::Relative => Ok(self.relative_base.wrapping_add(raw)),
            AddressingMode::Immediate => Err(VMError::ImmediateWriteTarget {
                instruction: instr.mnemonic(),
                pc,
            }),
        }
    }

    /// Executes a decoded instruction.
    fn exec(&mut self, decoded: Decoded) -> Result<Option<i64>, VMError> {
        let [a, b, c] = decoded.params;
        self.profile.record(decoded.instr.category());

        match decoded.instr {
            Instruction::Add => self.op_add(a, b, c)?,
            Instruction::Mul => self.op_mul(a, b, c)?,
            Instruction::In => self.op_in(a, decoded.input)?,
            Instruction::Out => return Ok(Some(a)),
            Instruction::JumpIfTrue => self.op_jump_if(a != 0, b)?,
            Instruction::JumpIfFalse => self.op_jump_if(a == 0, b)?,
            Instruction::LessThan => self.op_less_than(a, b, c)?,
            Instruction::Equals => self.op_equals(a, b, c)?,
            Instruction::AdjustRelativeBase => self.op_adjust_relative_base(a),
            Instruction::Halt => self.op_halt(decoded.pc),
        }
        Ok(None)
    }

    fn op_add(&mut self, a: i64, b: i64, dst: i64) -> Result<(), VMError> {
        self.memory.set(dst, a.wrapping_add(b))
    }

    fn op_mul(&mut self, a: i64, b: i64, dst: i64) -> Result<(), VMError> {
        self.memory.set(dst, a.wrapping_mul(b))
    }

    fn op_in(&mut self, dst: i64, input: Option<i64>) -> Result<(), VMError> {
        let value = input.ok_or(VMError::InputExhausted)?;
        self.memory.set(dst, value)
    }

    fn op_jump_if(&mut self, taken: bool, target: i64) -> Result<(), VMError> {
        if taken {
            self.pc = usize::try_from(target).map_err(|_| VMError::AddressOutOfRange {
                address: target,
                capacity: self.memory.len(),
            })?;
        }
        Ok(())
    }

    fn op_less_than(&mut self, a: i64, b: i64, dst: i64) -> Result<(), VMError> {
        self.memory.set(dst, i64::from(a < b))
    }

    fn op_equals(&mut self, a: i64, b: i64, dst: i64) -> Result<(), VMError> {
        self.memory.set(dst, i64::from(a == b))
    }

    fn op_adjust_relative_base(&mut self, delta: i64) {
        self.relative_base = self.relative_base.wrapping_add(delta);
    }

    fn op_halt(&mut self, pc: usize) {
        trace!("halted at {pc} after {} instructions", self.profile.total());
        self.status = Status::Halted;
    }
}

impl FromStr for Machine {
    type Err = VMError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(&source.parse()?))
    }
}
