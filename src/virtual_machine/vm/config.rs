use crate::warn;
use std::env;

/// Default number of memory cells allocated for a machine.
pub const DEFAULT_MEMORY_CAPACITY: usize = 4096;

/// Environment variable overriding [`DEFAULT_MEMORY_CAPACITY`].
pub const MEMORY_ENV_VAR: &str = "INTCODE_MEMORY";

/// Construction parameters for a [`Machine`](super::Machine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Cells allocated up front. Programs longer than this get exactly their
    /// own length.
    pub memory_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl MachineConfig {
    /// Creates a configuration with the given memory capacity.
    pub const fn with_memory(memory_capacity: usize) -> Self {
        Self { memory_capacity }
    }

    /// Reads the configuration from the environment.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        match env::var(MEMORY_ENV_VAR) {
            Ok(raw) => Self::parse_memory(&raw).unwrap_or_else(|| {
                warn!("Ignoring {MEMORY_ENV_VAR}={raw:?}: expected a positive cell count");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    fn parse_memory(raw: &str) -> Option<Self> {
        match raw.trim().parse::<usize>() {
            Ok(0) | Err(_) => None,
            Ok(cells) => Some(Self::with_memory(cells)),
        }
    }
}
