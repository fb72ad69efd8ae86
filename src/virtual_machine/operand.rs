//! Opcode cell decoding.
//!
//! An opcode cell is read as five decimal digits, zero-padded on the left:
//!
//! ```text
//!   C B A D E
//!   │ │ │ └─┴── opcode (two low digits)
//!   │ │ └────── mode of operand 1
//!   │ └──────── mode of operand 2
//!   └────────── mode of operand 3
//! ```

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::Instruction;

/// Largest operand count of any instruction.
pub const MAX_PARAMS: usize = 3;

/// How an operand cell is interpreted.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressingMode {
    /// Operand is an absolute address.
    #[default]
    Position = 0,
    /// Operand is the value itself.
    Immediate = 1,
    /// Operand is an address offset by the relative base.
    Relative = 2,
}

impl AddressingMode {
    /// Returns a human-readable name for error messages and traces.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AddressingMode::Position => "Position",
            AddressingMode::Immediate => "Immediate",
            AddressingMode::Relative => "Relative",
        }
    }
}

impl TryFrom<i64> for AddressingMode {
    type Error = VMError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Position),
            1 => Ok(Self::Immediate),
            2 => Ok(Self::Relative),
            _ => Err(VMError::UnknownAddressingMode(value)),
        }
    }
}

/// Splits an opcode cell into its instruction and operand modes.
///
/// Only the digits belonging to the instruction's operands are validated;
/// higher digits are ignored. Unused mode slots are [`AddressingMode::Position`].
pub fn decode(cell: i64) -> Result<(Instruction, [AddressingMode; MAX_PARAMS]), VMError> {
    if cell < 0 {
        return Err(VMError::UnknownOpcode(cell));
    }

    let instr = Instruction::try_from(cell % 100)?;
    let mut modes = [AddressingMode::Position; MAX_PARAMS];
    let mut digits = cell / 100;
    for mode in modes.iter_mut().take(instr.param_count()) {
        *mode = AddressingMode::try_from(digits % 10)?;
        digits /= 10;
    }

    Ok((instr, modes))
}
