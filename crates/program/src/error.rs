//! Error types for the [`Program`](crate::Program) byte buffer and assembler.

use thiserror::Error;

/// Errors raised while building or reading a [`Program`](crate::Program).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// A positional read ran past the end of the program bytes.
    #[error("underflow: attempted to read {requested} byte(s) at offset {offset}, size is {size}")]
    Underflow {
        offset: usize,
        requested: usize,
        size: usize,
    },

    /// A fixed-capacity program would have been exceeded by an append.
    #[error("capacity exceeded: {requested} byte(s) would not fit in {capacity} byte capacity at cursor {cursor}")]
    CapacityExceeded {
        cursor: usize,
        requested: usize,
        capacity: usize,
    },

    /// An argument passed to an assembler method was invalid.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

/// Convenience alias for `beast-program` fallible operations.
pub type ProgramResult<T> = Result<T, ProgramError>;
