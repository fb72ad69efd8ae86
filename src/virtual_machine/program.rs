//! Intcode program representation and text encoding.
//!
//! The only external format is comma-separated signed decimals, e.g.
//! `1,9,10,3,2,3,11,0,99,30,40,50`. Whitespace (including newlines) anywhere
//! in the text is ignored.

use crate::virtual_machine::errors::VMError;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// An Intcode program: the initial contents of a machine's low memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    cells: Vec<i64>,
}

impl Program {
    /// Creates a program from already-parsed cells.
    pub fn new(cells: Vec<i64>) -> Self {
        Self { cells }
    }

    /// Reads and parses a program file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VMError> {
        let path_ref = path.as_ref();
        let source = fs::read_to_string(path_ref).map_err(|e| VMError::Io {
            path: path_ref.display().to_string(),
            kind: e.kind(),
            reason: e.to_string(),
        })?;
        source.parse()
    }

    /// Overwrites one cell before the program is loaded into a machine.
    ///
    /// Drivers use this to select a mode through position 0. Only existing
    /// cells can be patched.
    pub fn patch(&mut self, address: usize, value: i64) -> Result<(), VMError> {
        let capacity = self.cells.len();
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(VMError::AddressOutOfRange {
                address: i64::try_from(address).unwrap_or(i64::MAX),
                capacity,
            })?;
        *cell = value;
        Ok(())
    }

    /// Returns the program cells.
    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the program has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Consumes the program and returns its cells.
    pub fn into_cells(self) -> Vec<i64> {
        self.cells
    }
}

impl FromStr for Program {
    type Err = VMError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let text: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            return Ok(Self::default());
        }

        let cells = text
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                token
                    .parse::<i64>()
                    .map_err(|_| VMError::MalformedProgramText {
                        index,
                        token: token.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { cells })
    }
}

impl From<Vec<i64>> for Program {
    fn from(cells: Vec<i64>) -> Self {
        Self::new(cells)
    }
}

impl From<&[i64]> for Program {
    fn from(cells: &[i64]) -> Self {
        Self::new(cells.to_vec())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}
