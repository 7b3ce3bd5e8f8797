use thiserror::Error;

/// Errors raised by pipe slot operations and pipeline wiring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Drawing from an empty slot.
    #[error("underflow: slot {slot} on pipe '{pipe}' is empty")]
    Underflow { pipe: String, slot: usize },

    /// Adding to a slot that is already at capacity.
    #[error("capacity exceeded: slot {slot} on pipe '{pipe}' is full")]
    CapacityExceeded { pipe: String, slot: usize },

    /// A slot index outside `[0, n)` for the pipe's declared input/output count.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

/// Convenience alias for `beast-pipeline` fallible operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
