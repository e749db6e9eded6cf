//! Error types for the logging facility

use thiserror::Error;

/// Errors returned when reconfiguring a ring buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A buffer must hold at least one line
    #[error("ring buffer capacity must be greater than zero")]
    ZeroCapacity,

    /// Capacity can only grow once the buffer exists
    #[error("cannot shrink ring buffer from {current} to {requested} lines")]
    Shrink { current: usize, requested: usize },

    /// Capacity plus slack does not fit the slot table limit
    #[error("ring buffer of {capacity} lines plus {slack} slack exceeds the limit of {max} slots")]
    TooLarge {
        capacity: usize,
        slack: usize,
        max: usize,
    },
}

/// Errors produced while interpreting logger configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown log level '{0}' (expected error, warn, info or debug)")]
    UnknownLevel(String),

    #[error("unknown output mode '{0}' (expected direct or buffered)")]
    UnknownMode(String),

    #[error("invalid buffer capacity '{0}'")]
    InvalidCapacity(String),
}
