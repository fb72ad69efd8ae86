//! Intcode library.
//!
//! Provides the Intcode virtual machine, its program format, and a
//! multi-machine pipeline coordinator.

pub mod utils;
pub mod virtual_machine;
