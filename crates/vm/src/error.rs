//! Error types for session, decoder, and evaluator operations.

use beast_program::ProgramError;
use thiserror::Error;

/// Errors raised while executing a BEAST program against a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Reading past the end of the program, or drawing from an empty slot.
    #[error("underflow: {0}")]
    Underflow(#[from] ProgramError),

    /// A fixed-capacity resource (variable table, string table, print buffer, stack slot) is full.
    #[error("capacity exceeded: {reason}")]
    CapacityExceeded { reason: String },

    /// A negative/out-of-range index, negative weight, null evaluator, or oversized string.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A link chain pointed at an undeclared variable, an out-of-range index, or cycled.
    #[error("invalid reference: {reason}")]
    InvalidReference { reason: String },

    /// The decoded opcode byte is not in the defined instruction set.
    #[error("invalid opcode: {opcode:#04x}")]
    InvalidOpcode { opcode: u8 },

    /// A jump target fell outside `[0, program_size]`.
    #[error("invalid jump: target {target} is outside [0, {program_size}]")]
    InvalidJump { target: i64, program_size: usize },

    /// An unknown `(major, minor)` system call pair.
    #[error("invalid system call: major={major}, minor={minor}")]
    InvalidSystemCall { major: i8, minor: i8 },

    /// Modulo by zero.
    #[error("divide by zero")]
    DivideByZero,

    /// Pop or peek on an empty stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// Evaluating with no evaluators, or misusing a dirty-flag query on the wrong behavior.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
}

/// Convenience alias for `beast-vm` fallible operations.
pub type VmResult<T> = Result<T, VmError>;
