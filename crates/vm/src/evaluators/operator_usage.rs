use beast_program::OpCode;

use super::Evaluator;
use crate::error::VmResult;
use crate::session::VmSession;

/// Ratio of one opcode's executions to total steps executed; `0.0` if nothing ran.
///
/// `NoOpEvaluator` from the original design is just this evaluator fixed to
/// [`OpCode::NoOp`] — see [`OperatorUsageEvaluator::no_op`].
pub struct OperatorUsageEvaluator {
    opcode: OpCode,
}

impl OperatorUsageEvaluator {
    pub fn new(opcode: OpCode) -> Self {
        Self { opcode }
    }

    pub fn no_op() -> Self {
        Self::new(OpCode::NoOp)
    }
}

impl Evaluator for OperatorUsageEvaluator {
    fn evaluate(&self, session: &mut VmSession) -> VmResult<f64> {
        let stats = session.statistics();
        let total = stats.steps_executed();
        if total == 0 {
            return Ok(0.0);
        }
        Ok(stats.operator_executions(self.opcode) as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beast_config::SessionLimits;
    use beast_program::Program;

    use crate::vm::{CpuVirtualMachine, MessageSeverity};

    #[test]
    fn zero_when_nothing_ran() {
        let session = &mut VmSession::new(Program::new_growing(), SessionLimits::default());
        assert_eq!(OperatorUsageEvaluator::no_op().evaluate(session).unwrap(), 0.0);
    }

    #[test]
    fn ratio_matches_executed_fraction() {
        let mut program = Program::new_growing();
        program.no_op().unwrap();
        program.no_op().unwrap();
        program.terminate(0).unwrap();
        let mut session = VmSession::new(program, SessionLimits::default());
        let vm = CpuVirtualMachine::new(MessageSeverity::Panic);
        while vm.step(&mut session, false).unwrap() {}
        assert_eq!(OperatorUsageEvaluator::no_op().evaluate(&mut session).unwrap(), 2.0 / 3.0);
    }
}
