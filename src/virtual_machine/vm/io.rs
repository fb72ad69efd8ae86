//! Input side of the machine's I/O channel.
//!
//! A machine first drains its own FIFO queue. When that is empty it asks the
//! [`InputSource`] passed to [`Machine::step_with`](super::Machine::step_with),
//! which lets a driver compute the next input from whatever the machine has
//! emitted so far. If neither yields a value the instruction fails with
//! [`VMError::InputExhausted`](crate::virtual_machine::errors::VMError::InputExhausted).

use std::collections::VecDeque;

/// Supplier of input values beyond the machine's own queue.
pub trait InputSource {
    /// Returns the next input value, or `None` if none is available.
    fn next_input(&mut self) -> Option<i64>;
}

/// Source that never yields; an empty queue means the input is exhausted.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn next_input(&mut self) -> Option<i64> {
        None
    }
}

impl InputSource for VecDeque<i64> {
    fn next_input(&mut self) -> Option<i64> {
        self.pop_front()
    }
}

/// Source backed by a closure, for input policies that inspect driver state.
pub struct InputFn<F>(pub F);

impl<F: FnMut() -> Option<i64>> InputSource for InputFn<F> {
    fn next_input(&mut self) -> Option<i64> {
        (self.0)()
    }
}

/// Source that yields the same value forever.
#[derive(Clone, Copy, Debug)]
pub struct Constant(pub i64);

impl InputSource for Constant {
    fn next_input(&mut self) -> Option<i64> {
        Some(self.0)
    }
}
