use rand::Rng;

use super::Evaluator;
use crate::error::{VmError, VmResult};
use crate::session::{VariableIoBehavior, VmSession};
use crate::vm::{CpuVirtualMachine, MessageSeverity};

const INPUT_VAR: i32 = 0;
const OUTPUT_VAR: i32 = 1;

/// Feeds random data through a program's declared input/output variables and scores how
/// faithfully it echoes each value back out within a step budget.
pub struct RandomSerialDataPassthroughEvaluator {
    data_count: u32,
    repeats: u32,
    max_steps: u32,
}

impl RandomSerialDataPassthroughEvaluator {
    pub fn new(data_count: u32, repeats: u32, max_steps: u32) -> Self {
        Self {
            data_count,
            repeats,
            max_steps,
        }
    }

    fn run_trial(&self, session: &mut VmSession, vm: &CpuVirtualMachine) -> VmResult<f64> {
        session.reset();
        session.set_variable_behavior(INPUT_VAR, VariableIoBehavior::Input)?;
        session.set_variable_behavior(OUTPUT_VAR, VariableIoBehavior::Output)?;

        let mut rng = rand::thread_rng();
        let mut matches = 0u32;
        let mut steps_used = 0u32;

        'data: for _ in 0..self.data_count {
            if steps_used >= self.max_steps {
                break;
            }
            let value: i32 = rng.gen();
            session.write_from_outside(INPUT_VAR, value)?;

            loop {
                if steps_used >= self.max_steps {
                    break 'data;
                }
                let running = vm.step(session, false)?;
                steps_used += 1;
                if Self::output_available(session)? {
                    break;
                }
                if !running {
                    break 'data;
                }
            }

            if Self::output_available(session)? {
                let out = session.read_from_outside(OUTPUT_VAR)?;
                if out == value {
                    matches += 1;
                }
            }
        }

        let base = matches as f64 / self.data_count as f64;
        let bonus = if matches == 0 { 0.1 * self.data_count as f64 } else { 0.0 };
        Ok((base + bonus).min(1.0))
    }

    /// Treats an output variable that hasn't been declared yet (the guest program may
    /// still be setting up) as simply "not available", rather than an error.
    fn output_available(session: &VmSession) -> VmResult<bool> {
        match session.has_output_data_available(OUTPUT_VAR, false) {
            Ok(value) => Ok(value),
            Err(VmError::InvalidReference { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }
}

impl Evaluator for RandomSerialDataPassthroughEvaluator {
    fn evaluate(&self, session: &mut VmSession) -> VmResult<f64> {
        let vm = CpuVirtualMachine::new(MessageSeverity::Panic);
        let mut worst = f64::INFINITY;
        for _ in 0..self.repeats {
            let score = self.run_trial(session, &vm).unwrap_or(0.0);
            worst = worst.min(score);
        }
        Ok(if worst.is_finite() { worst } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beast_config::SessionLimits;
    use beast_program::{Program, VariableType};

    #[test]
    fn perfect_passthrough_scores_one() {
        // var0 = input, var1 = output; copy var0 into var1 in a loop that jumps back to
        // itself, consuming steps until the evaluator's budget runs out. Variables are
        // declared directly on the session: the evaluator's contract fixes their indices
        // and behavior before any bytecode runs, independent of what the candidate declares.
        let mut program = Program::new_growing();
        let loop_start = program.pointer();
        program.copy_variable(0, false, 1, false).unwrap();
        let offset = loop_start as i32 - program.pointer() as i32 - 5;
        program.unconditional_jump_to_relative_address(offset).unwrap();

        let mut session = VmSession::new(program, SessionLimits::default());
        session.declare(0, VariableType::Int32).unwrap();
        session.declare(1, VariableType::Int32).unwrap();
        let evaluator = RandomSerialDataPassthroughEvaluator::new(5, 2, 1000);
        let score = evaluator.evaluate(&mut session).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn silent_program_scores_with_small_data_bonus() {
        let mut program = Program::new_growing();
        program.terminate(0).unwrap();

        let mut session = VmSession::new(program, SessionLimits::default());
        session.declare(0, VariableType::Int32).unwrap();
        session.declare(1, VariableType::Int32).unwrap();
        let evaluator = RandomSerialDataPassthroughEvaluator::new(2, 1, 10);
        let score = evaluator.evaluate(&mut session).unwrap();
        assert!((score - 0.2).abs() < 1e-9);
    }
}
