//! Memory-to-listing disassembler.
//!
//! Operand syntax:
//! - `#v`: immediate value
//! - `[a]`: position-mode address
//! - `[rb+a]` / `[rb-a]`: relative-mode address
//!
//! Cells that do not decode as an instruction (or whose operands run past the
//! end of memory) are listed as `DATA value` and skip a single cell.

use crate::virtual_machine::operand::{AddressingMode, decode};
use std::fmt;

/// One disassembled instruction or data cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// Address of the first cell.
    pub address: usize,
    /// Number of cells covered.
    pub width: usize,
    /// Rendered instruction text.
    pub text: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}: {}", self.address, self.text)
    }
}

fn render_operand(mode: AddressingMode, raw: i64) -> String {
    match mode {
        AddressingMode::Position => format!("[{raw}]"),
        AddressingMode::Immediate => format!("#{raw}"),
        AddressingMode::Relative if raw < 0 => format!("[rb{raw}]"),
        AddressingMode::Relative => format!("[rb+{raw}]"),
    }
}

fn data(address: usize, value: i64) -> Line {
    Line {
        address,
        width: 1,
        text: format!("DATA {value}"),
    }
}

/// Disassembles the instruction starting at `address`.
///
/// `address` must be within `memory`.
pub fn disassemble_one(memory: &[i64], address: usize) -> Line {
    let cell = memory[address];
    let Ok((instr, modes)) = decode(cell) else {
        return data(address, cell);
    };

    let params = instr.param_count();
    let Some(operands) = memory.get(address + 1..address + 1 + params) else {
        return data(address, cell);
    };

    let mut text = instr.mnemonic().to_string();
    for (i, (&raw, &mode)) in operands.iter().zip(modes.iter()).enumerate() {
        text.push_str(if i == 0 { " " } else { ", " });
        text.push_str(&render_operand(mode, raw));
    }

    Line {
        address,
        width: 1 + params,
        text,
    }
}

/// Disassembles up to `len` cells of `memory` starting at `start`.
pub fn disassemble(memory: &[i64], start: usize, len: usize) -> Vec<Line> {
    let end = start.saturating_add(len).min(memory.len());
    let mut lines = Vec::new();
    let mut address = start;
    while address < end {
        let line = disassemble_one(memory, address);
        address += line.width;
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(memory: &[i64]) -> Vec<String> {
        disassemble(memory, 0, memory.len())
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn arithmetic_program() {
        assert_eq!(
            texts(&[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]),
            vec![
                "ADD [9], [10], [3]",
                "MUL [3], [11], [0]",
                "HALT",
                "DATA 30",
                "DATA 40",
                "DATA 50",
            ]
        );
    }

    #[test]
    fn mixed_modes() {
        assert_eq!(
            texts(&[21101, 5, -3, 4, 109, -2, 204, -1]),
            vec!["ADD #5, #-3, [rb+4]", "ARB #-2", "OUT [rb-1]"]
        );
    }

    #[test]
    fn truncated_instruction_is_data() {
        assert_eq!(texts(&[1, 2]), vec!["DATA 1", "DATA 2"]);
    }

    #[test]
    fn line_addresses_and_display() {
        let lines = disassemble(&[104, 7, 99], 0, 3);
        assert_eq!(lines[0].address, 0);
        assert_eq!(lines[0].width, 2);
        assert_eq!(lines[1].address, 2);
        assert_eq!(lines[1].to_string(), "    2: HALT");
    }

    #[test]
    fn range_is_clamped_to_memory() {
        let lines = disassemble(&[99, 99], 1, 100);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].address, 1);
    }
}
