//! # BEAST virtual machine
//!
//! The register-and-stack machine that executes BEAST bytecode, the session state it
//! executes against, and the evaluators that score a session's run.
//!
//! ## Architecture
//!
//! - [`session::VmSession`]: guest state bound to a [`beast_program::Program`] — declared
//!   variables, string table, print buffer, cursor, and runtime statistics.
//! - [`vm::CpuVirtualMachine`]: decodes and dispatches one instruction per
//!   [`step`](vm::CpuVirtualMachine::step) call, in either live or dry-run mode.
//! - [`evaluators`]: pure scorers that read a session's post-run statistics, or drive a
//!   session themselves, to produce a score in `[0.0, 1.0]`.
//!
//! ## Example
//!
//! ```
//! use beast_config::SessionLimits;
//! use beast_program::Program;
//! use beast_vm::session::VmSession;
//! use beast_vm::vm::{CpuVirtualMachine, MessageSeverity};
//!
//! let mut program = Program::new_growing();
//! program.no_op().unwrap();
//! program.terminate(0).unwrap();
//!
//! let mut session = VmSession::new(program, SessionLimits::default());
//! let vm = CpuVirtualMachine::new(MessageSeverity::Warning);
//! while vm.step(&mut session, false).unwrap() {}
//! assert_eq!(session.statistics().return_code(), 0);
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

/// Error types for session, decoder, and evaluator operations.
pub mod error;
/// Pure scorers over a [`session::VmSession`].
pub mod evaluators;
/// Guest execution state: variables, string table, print buffer, cursor, statistics.
pub mod session;
/// The decoder/dispatcher that steps a session one instruction at a time.
pub mod vm;

pub use error::{VmError, VmResult};
pub use evaluators::{
    AggregationEvaluator, Evaluator, OperatorUsageEvaluator, RandomSerialDataPassthroughEvaluator,
    RuntimeStatisticsEvaluator,
};
pub use session::{RuntimeStatistics, SessionState, VariableIoBehavior, VmSession};
pub use vm::{CpuVirtualMachine, MessageSeverity};
