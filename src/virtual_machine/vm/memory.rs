use crate::virtual_machine::errors::VMError;

/// Linear, zero-initialized machine memory.
///
/// The program occupies the low addresses; the remaining cells up to the
/// configured capacity start at zero and serve as scratch space for programs
/// that write past their own end.
pub(super) struct Memory {
    cells: Vec<i64>,
}

impl Memory {
    /// Loads `program` into a memory of at least `capacity` cells.
    pub(super) fn new(program: &[i64], capacity: usize) -> Self {
        let mut cells = Vec::with_capacity(capacity.max(program.len()));
        cells.extend_from_slice(program);
        if cells.len() < capacity {
            cells.resize(capacity, 0);
        }
        Self { cells }
    }

    /// Converts a machine address into an index, checking bounds.
    #[inline]
    fn index(&self, address: i64) -> Result<usize, VMError> {
        usize::try_from(address)
            .ok()
            .filter(|&i| i < self.cells.len())
            .ok_or(VMError::AddressOutOfRange {
                address,
                capacity: self.cells.len(),
            })
    }

    /// Returns the value stored at `address`.
    #[inline]
    pub(super) fn get(&self, address: i64) -> Result<i64, VMError> {
        Ok(self.cells[self.index(address)?])
    }

    /// Stores `value` at `address`.
    #[inline]
    pub(super) fn set(&mut self, address: i64, value: i64) -> Result<(), VMError> {
        let i = self.index(address)?;
        self.cells[i] = value;
        Ok(())
    }

    /// Returns the number of allocated cells.
    pub(super) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(super) fn as_slice(&self) -> &[i64] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_is_padded_with_zeros() {
        let memory = Memory::new(&[1, 2, 3], 6);
        assert_eq!(memory.as_slice(), &[1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn long_program_keeps_its_length() {
        let memory = Memory::new(&[1, 2, 3, 4], 2);
        assert_eq!(memory.len(), 4);
    }

    #[test]
    fn set_then_get() {
        let mut memory = Memory::new(&[], 8);
        memory.set(7, -42).unwrap();
        assert_eq!(memory.get(7).unwrap(), -42);
    }

    #[test]
    fn out_of_range_address() {
        let mut memory = Memory::new(&[99], 4);
        assert_eq!(
            memory.get(4),
            Err(VMError::AddressOutOfRange {
                address: 4,
                capacity: 4
            })
        );
        assert!(matches!(
            memory.set(1 << 40, 1),
            Err(VMError::AddressOutOfRange { .. })
        ));
    }

    #[test]
    fn negative_address() {
        let memory = Memory::new(&[99], 4);
        assert!(matches!(
            memory.get(-1),
            Err(VMError::AddressOutOfRange { address: -1, .. })
        ));
    }
}
