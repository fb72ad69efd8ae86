//! Intcode virtual machine.
//!
//! Programs are flat lists of signed 64-bit cells. The machine fetches an
//! opcode cell, resolves the operands that follow it according to the mode
//! digits packed into the opcode, executes the operation and moves on.
//!
//! # Architecture
//!
//! - **Memory**: a fixed-capacity array of `i64` cells, zero-filled past the program
//! - **Addressing**: position, immediate and relative (offset by the relative base)
//! - **I/O**: a FIFO input queue per machine, optionally backed by an [`vm::InputSource`];
//!   outputs are returned to the caller one at a time
//! - **Lifecycle**: Ready, Running, then Halted or Faulted; both end states are terminal
//! - **Profiling**: executed instructions are counted by category
//!
//! # Modules
//!
//! - [`disassembler`]: Memory-to-listing rendering
//! - [`errors`]: Parse and execution error types
//! - [`isa`]: Instruction set definition and opcode mappings
//! - [`operand`]: Opcode cell decoding and addressing modes
//! - [`pipeline`]: Chained and feedback-looped machines
//! - [`program`]: Program text parsing and loading
//! - [`vm`]: Core virtual machine implementation

pub mod disassembler;
pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod operand;
pub mod pipeline;
pub mod program;
pub mod vm;
