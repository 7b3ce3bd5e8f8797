use beast_program::OpCode;

use super::Evaluator;
use crate::error::{VmError, VmResult};
use crate::session::VmSession;
use crate::vm::{CpuVirtualMachine, MessageSeverity};

/// Compares a session's already-executed dynamic run against a fresh dry run of the same
/// program to score how "explorative" the dynamic run was.
pub struct RuntimeStatisticsEvaluator {
    dyn_noop_weight: f64,
    stat_noop_weight: f64,
}

impl RuntimeStatisticsEvaluator {
    pub fn new(dyn_noop_weight: f64, stat_noop_weight: f64) -> VmResult<Self> {
        if dyn_noop_weight < 0.0 || stat_noop_weight < 0.0 {
            return Err(VmError::InvalidArgument {
                reason: "weights must be non-negative".to_string(),
            });
        }
        if dyn_noop_weight + stat_noop_weight > 1.0 {
            return Err(VmError::InvalidArgument {
                reason: "dyn_noop_weight + stat_noop_weight must not exceed 1.0".to_string(),
            });
        }
        Ok(Self {
            dyn_noop_weight,
            stat_noop_weight,
        })
    }
}

impl Evaluator for RuntimeStatisticsEvaluator {
    fn evaluate(&self, session: &mut VmSession) -> VmResult<f64> {
        let dynamic = session.statistics();
        let dynamic_steps = dynamic.steps_executed();
        if dynamic_steps == 0 {
            return Ok(0.0);
        }
        let dyn_noop_fraction = dynamic.operator_executions(OpCode::NoOp) as f64 / dynamic_steps as f64;
        let dynamic_executed_indices = dynamic.executed_indices().len();

        let mut static_session = VmSession::new(session.program().clone(), *session.limits());
        let vm = CpuVirtualMachine::new(MessageSeverity::Panic);
        while vm.step(&mut static_session, true).unwrap_or(false) {}
        let static_stats = static_session.statistics();
        let static_steps = static_stats.steps_executed();
        if static_steps == 0 {
            return Ok(0.0);
        }
        let static_noop_fraction = static_stats.operator_executions(OpCode::NoOp) as f64 / static_steps as f64;
        let static_distinct_indices = static_stats.executed_indices().len();

        let executed_fraction = if static_distinct_indices == 0 {
            0.0
        } else {
            dynamic_executed_indices as f64 / static_distinct_indices as f64
        };

        let program_executed_weight = 1.0 - self.dyn_noop_weight - self.stat_noop_weight;
        Ok((self.dyn_noop_weight * (1.0 - dyn_noop_fraction)
            + self.stat_noop_weight * static_noop_fraction
            + program_executed_weight * (1.0 - executed_fraction))
            .clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beast_config::SessionLimits;
    use beast_program::Program;

    #[test]
    fn rejects_weights_summing_over_one() {
        assert!(matches!(
            RuntimeStatisticsEvaluator::new(0.6, 0.6),
            Err(VmError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn zero_when_dynamic_run_is_empty() {
        let mut session = VmSession::new(Program::new_growing(), SessionLimits::default());
        let evaluator = RuntimeStatisticsEvaluator::new(0.0, 0.0).unwrap();
        assert_eq!(evaluator.evaluate(&mut session).unwrap(), 0.0);
    }

    #[test]
    fn dyn_and_stat_zero_reduces_to_one_minus_executed_fraction() {
        let mut program = Program::new_growing();
        program.no_op().unwrap();
        program.no_op().unwrap();
        program.terminate(0).unwrap();
        let mut session = VmSession::new(program, SessionLimits::default());
        let vm = CpuVirtualMachine::new(MessageSeverity::Panic);
        while vm.step(&mut session, false).unwrap() {}

        let evaluator = RuntimeStatisticsEvaluator::new(0.0, 0.0).unwrap();
        let score = evaluator.evaluate(&mut session).unwrap();
        // Two distinct opcodes appear in the program (NoOp, Terminate); both get executed
        // dynamically, so the executed fraction is 1.0 and the score is 0.0.
        assert!((score - 0.0).abs() < 1e-9);
    }
}
