use std::io;
use thiserror::Error;

/// Errors raised while loading, decoding, or executing an Intcode program.
///
/// Every execution error is fatal for the machine that raised it: the machine
/// moves to the faulted state and replays the same error on any further step.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VMError {
    /// Opcode value absent from the instruction set.
    #[error("unknown opcode {0}")]
    UnknownOpcode(i64),
    /// Parameter mode digit other than 0, 1 or 2.
    #[error("unknown addressing mode {0}")]
    UnknownAddressingMode(i64),
    /// An input instruction ran with nothing queued and no input source.
    #[error("input exhausted")]
    InputExhausted,
    /// Address is negative or beyond the allocated memory.
    #[error("address {address} out of range (memory holds {capacity} cells)")]
    AddressOutOfRange { address: i64, capacity: usize },
    /// Write target encoded in immediate mode.
    #[error("instruction {instruction} at {pc} writes through an immediate operand")]
    ImmediateWriteTarget { instruction: &'static str, pc: usize },
    /// Token in the program text is not a signed decimal integer.
    #[error("malformed program text: token {index} ({token:?}) is not an integer")]
    MalformedProgramText { index: usize, token: String },
    /// Failed to read a program file.
    #[error("io error reading {path}: {reason}")]
    Io {
        path: String,
        kind: io::ErrorKind,
        reason: String,
    },
    /// A pipeline was built without any machine.
    #[error("pipeline needs at least one machine")]
    EmptyPipeline,
    /// A pipeline was given a different number of seeds than machines.
    #[error("pipeline has {machines} machines but {seeds} seeds")]
    SeedCountMismatch { machines: usize, seeds: usize },
}
