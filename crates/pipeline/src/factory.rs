//! [`ProgramFactoryPipe`] and the [`ProgramFactory`] trait it synthesizes candidates with.

use beast_config::SessionLimits;
use beast_program::{Program, VariableType};
use rand::Rng;

use crate::error::PipelineResult;
use crate::pipe::{Pipe, PipeBase};
use crate::Candidate;

/// Generates a single candidate program, bounded by the target size and the session
/// limits the factory pipe was configured with.
pub trait ProgramFactory: Send + Sync {
    fn generate(&self, target_size: usize, limits: &SessionLimits) -> Vec<u8>;
}

/// The mix of opcodes [`RandomProgramFactory`] draws from. Each entry is an arity-aware
/// emitter so every generated byte stream decodes cleanly: no opcode is emitted unless
/// its full payload also fits under `target_size`.
type Emitter = fn(&mut Program, &mut dyn RngShim, &SessionLimits) -> beast_program::ProgramResult<()>;

/// Narrow seam over `rand::Rng` so the emitter table can take a trait object.
pub trait RngShim {
    fn gen_range_i32(&mut self, lo: i32, hi: i32) -> i32;
    fn gen_bool(&mut self, p: f64) -> bool;
}

impl<T: Rng> RngShim for T {
    fn gen_range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        self.gen_range(lo..hi)
    }

    fn gen_bool(&mut self, p: f64) -> bool {
        Rng::gen_bool(self, p)
    }
}

fn emit_no_op(p: &mut Program, _r: &mut dyn RngShim, _l: &SessionLimits) -> beast_program::ProgramResult<()> {
    p.no_op()
}

fn emit_declare(p: &mut Program, r: &mut dyn RngShim, l: &SessionLimits) -> beast_program::ProgramResult<()> {
    let var = r.gen_range_i32(0, l.variable_count as i32);
    let var_type = if r.gen_bool(0.2) {
        VariableType::Link
    } else {
        VariableType::Int32
    };
    p.declare_variable(var, var_type)
}

fn emit_set(p: &mut Program, r: &mut dyn RngShim, l: &SessionLimits) -> beast_program::ProgramResult<()> {
    let var = r.gen_range_i32(0, l.variable_count as i32);
    let value = r.gen_range_i32(i32::MIN, i32::MAX);
    p.set_variable(var, false, value)
}

fn emit_add_constant(p: &mut Program, r: &mut dyn RngShim, l: &SessionLimits) -> beast_program::ProgramResult<()> {
    let var = r.gen_range_i32(0, l.variable_count as i32);
    let c = r.gen_range_i32(-1000, 1000);
    p.add_constant_to_variable(var, false, c)
}

fn emit_add_variable(p: &mut Program, r: &mut dyn RngShim, l: &SessionLimits) -> beast_program::ProgramResult<()> {
    let src = r.gen_range_i32(0, l.variable_count as i32);
    let dst = r.gen_range_i32(0, l.variable_count as i32);
    p.add_variable_to_variable(src, false, dst, false)
}

fn emit_compare(p: &mut Program, r: &mut dyn RngShim, l: &SessionLimits) -> beast_program::ProgramResult<()> {
    let var = r.gen_range_i32(0, l.variable_count as i32);
    let c = r.gen_range_i32(-10, 10);
    let target = r.gen_range_i32(0, l.variable_count as i32);
    p.compare_if_variable_gt_constant(var, false, c, target, false)
}

fn emit_rel_jump_if(p: &mut Program, r: &mut dyn RngShim, l: &SessionLimits) -> beast_program::ProgramResult<()> {
    let cond = r.gen_range_i32(0, l.variable_count as i32);
    let addr = r.gen_range_i32(-8, 8);
    p.relative_jump_if_variable_gt_0(cond, false, addr)
}

fn emit_print(p: &mut Program, r: &mut dyn RngShim, l: &SessionLimits) -> beast_program::ProgramResult<()> {
    let var = r.gen_range_i32(0, l.variable_count as i32);
    p.print_variable(var, false, false)
}

const EMITTERS: &[Emitter] = &[
    emit_no_op,
    emit_declare,
    emit_set,
    emit_add_constant,
    emit_add_variable,
    emit_compare,
    emit_rel_jump_if,
    emit_print,
];

/// Synthesizes well-formed, decoder-valid random programs: a uniform draw over a curated
/// opcode mix, stopping before an emitted instruction would exceed the target size, and
/// always closed off with an explicit `Terminate`.
#[derive(Default)]
pub struct RandomProgramFactory;

impl ProgramFactory for RandomProgramFactory {
    fn generate(&self, target_size: usize, limits: &SessionLimits) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        let mut program = Program::new_growing();
        // Reserve room for the closing Terminate (opcode + i8 code = 2 bytes).
        let body_budget = target_size.saturating_sub(2);
        loop {
            if program.size() >= body_budget {
                break;
            }
            let emitter = EMITTERS[rng.gen_range(0..EMITTERS.len())];
            let before = program.size();
            if emitter(&mut program, &mut rng, limits).is_err() {
                continue;
            }
            if program.size() > body_budget {
                // Programs are append-only; roll back the last emit by re-slicing the
                // underlying bytes rather than undoing it instruction-by-instruction.
                program = Program::from_bytes(program.as_bytes()[..before].to_vec());
                break;
            }
        }
        let _ = program.terminate(0);
        program.into_bytes()
    }
}

/// Synthesizes candidates from an injected [`ProgramFactory`] until its output slot
/// reaches capacity. One input-less, one-output stage.
pub struct ProgramFactoryPipe {
    base: PipeBase,
    factory: Box<dyn ProgramFactory>,
    target_size: usize,
    limits: SessionLimits,
}

impl ProgramFactoryPipe {
    pub fn new(
        name: impl Into<String>,
        max_candidates: usize,
        target_size: usize,
        limits: SessionLimits,
        factory: Box<dyn ProgramFactory>,
    ) -> Self {
        Self {
            base: PipeBase::new(name, 0, 1, max_candidates),
            factory,
            target_size,
            limits,
        }
    }

    pub fn random(name: impl Into<String>, max_candidates: usize, target_size: usize, limits: SessionLimits) -> Self {
        Self::new(name, max_candidates, target_size, limits, Box::new(RandomProgramFactory))
    }
}

impl Pipe for ProgramFactoryPipe {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn input_count(&self) -> usize {
        self.base.input_count()
    }

    fn output_count(&self) -> usize {
        self.base.output_count()
    }

    fn input_has_space(&self, slot: usize) -> PipelineResult<bool> {
        self.base.input_has_space(slot)
    }

    fn add_input(&self, slot: usize, candidate: Candidate) -> PipelineResult<()> {
        self.base.add_input(slot, candidate)
    }

    fn draw_input(&self, slot: usize) -> PipelineResult<Candidate> {
        self.base.draw_input(slot)
    }

    fn has_output(&self, slot: usize) -> PipelineResult<bool> {
        self.base.has_output(slot)
    }

    fn draw_output(&self, slot: usize) -> PipelineResult<Candidate> {
        self.base.draw_output(slot)
    }

    fn inputs_are_saturated(&self) -> bool {
        self.base.inputs_are_saturated()
    }

    fn outputs_are_saturated(&self) -> bool {
        self.base.outputs_are_saturated()
    }

    fn execute(&self) -> PipelineResult<()> {
        while !self.base.outputs_are_saturated() {
            let bytes = self.factory.generate(self.target_size, &self.limits);
            self.base.push_output(0, Candidate::new(bytes))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beast_program::OpCode;

    #[test]
    fn random_program_terminates_and_fits_budget() {
        let limits = SessionLimits::default();
        let bytes = RandomProgramFactory.generate(64, &limits);
        assert!(bytes.len() <= 64);
        assert_eq!(bytes[bytes.len() - 2], OpCode::Terminate as u8);
    }

    #[test]
    fn execute_fills_output_to_capacity() {
        let pipe = ProgramFactoryPipe::random("factory", 3, 32, SessionLimits::default());
        pipe.execute().unwrap();
        assert!(pipe.has_output(0).unwrap());
        assert!(pipe.outputs_are_saturated());
        let mut drained = 0;
        while pipe.draw_output(0).is_ok() {
            drained += 1;
        }
        assert_eq!(drained, 3);
    }
}
