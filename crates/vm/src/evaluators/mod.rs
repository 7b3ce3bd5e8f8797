//! Pure scorers over a [`VmSession`](crate::session::VmSession): `evaluate` always returns
//! a finite score in `[0.0, 1.0]`.

mod aggregation;
mod operator_usage;
mod random_serial;
mod runtime_statistics;

pub use aggregation::AggregationEvaluator;
pub use operator_usage::OperatorUsageEvaluator;
pub use random_serial::RandomSerialDataPassthroughEvaluator;
pub use runtime_statistics::RuntimeStatisticsEvaluator;

use crate::error::VmResult;
use crate::session::VmSession;

/// A scorer over a session's state or execution.
///
/// Implementations may run the session's program themselves (as
/// [`RandomSerialDataPassthroughEvaluator`] does); built-in evaluators never mutate a
/// session they did not create internally.
pub trait Evaluator {
    fn evaluate(&self, session: &mut VmSession) -> VmResult<f64>;
}
