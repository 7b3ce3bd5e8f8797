use crate::error::PipelineResult;
use crate::pipe::{Pipe, PipeBase};
use crate::Candidate;

/// Drains its single input slot and discards every item, one input slot and no outputs.
pub struct NullSinkPipe {
    base: PipeBase,
}

impl NullSinkPipe {
    pub fn new(name: impl Into<String>, max_candidates: usize) -> Self {
        Self {
            base: PipeBase::new(name, 1, 0, max_candidates),
        }
    }
}

impl Pipe for NullSinkPipe {
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
        while self.base.has_input_available(0) {
            self.base.draw_input(0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_drains_all_queued_input() {
        let sink = NullSinkPipe::new("sink", 10);
        for i in 0..5u8 {
            sink.add_input(0, Candidate::new(vec![i])).unwrap();
        }
        sink.execute().unwrap();
        assert!(matches!(sink.draw_input(0), Err(crate::error::PipelineError::Underflow { .. })));
    }
}
