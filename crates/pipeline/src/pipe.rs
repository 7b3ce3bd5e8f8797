//! The bounded multi-slot data stage: [`Pipe`] is the capability every stage implements;
//! [`PipeBase`] is the shared input/output FIFO storage concrete pipes compose in.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::error::{PipelineError, PipelineResult};
use crate::Candidate;

struct BoundedSlot {
    items: Mutex<VecDeque<Candidate>>,
    capacity: usize,
}

impl BoundedSlot {
    fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    fn has_space(&self) -> bool {
        self.items.lock().len() < self.capacity
    }

    fn is_full(&self) -> bool {
        self.items.lock().len() >= self.capacity
    }

    fn push(&self, candidate: Candidate) -> bool {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return false;
        }
        items.push_back(candidate);
        true
    }

    fn pop(&self) -> Option<Candidate> {
        self.items.lock().pop_front()
    }

    fn has_items(&self) -> bool {
        !self.items.lock().is_empty()
    }
}

/// Shared input/output FIFO storage for a pipe. Every concrete pipe kind owns one and
/// delegates the [`Pipe`] slot methods to it; `execute` is the only method each kind
/// implements on its own.
pub struct PipeBase {
    name: String,
    inputs: Vec<BoundedSlot>,
    outputs: Vec<BoundedSlot>,
}

impl PipeBase {
    pub fn new(name: impl Into<String>, n_in: usize, n_out: usize, slot_capacity: usize) -> Self {
        Self {
            name: name.into(),
            inputs: (0..n_in).map(|_| BoundedSlot::new(slot_capacity)).collect(),
            outputs: (0..n_out).map(|_| BoundedSlot::new(slot_capacity)).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    fn input_slot(&self, slot: usize) -> PipelineResult<&BoundedSlot> {
        self.inputs.get(slot).ok_or_else(|| PipelineError::InvalidArgument {
            reason: format!("pipe '{}' has no input slot {slot}", self.name),
        })
    }

    fn output_slot(&self, slot: usize) -> PipelineResult<&BoundedSlot> {
        self.outputs.get(slot).ok_or_else(|| PipelineError::InvalidArgument {
            reason: format!("pipe '{}' has no output slot {slot}", self.name),
        })
    }

    pub fn input_has_space(&self, slot: usize) -> PipelineResult<bool> {
        Ok(self.input_slot(slot)?.has_space())
    }

    pub fn add_input(&self, slot: usize, candidate: Candidate) -> PipelineResult<()> {
        if !self.input_slot(slot)?.push(candidate) {
            return Err(PipelineError::CapacityExceeded {
                pipe: self.name.clone(),
                slot,
            });
        }
        Ok(())
    }

    pub fn draw_input(&self, slot: usize) -> PipelineResult<Candidate> {
        self.input_slot(slot)?.pop().ok_or_else(|| PipelineError::Underflow {
            pipe: self.name.clone(),
            slot,
        })
    }

    pub fn has_output(&self, slot: usize) -> PipelineResult<bool> {
        Ok(self.output_slot(slot)?.has_items())
    }

    pub fn draw_output(&self, slot: usize) -> PipelineResult<Candidate> {
        self.output_slot(slot)?.pop().ok_or_else(|| PipelineError::Underflow {
            pipe: self.name.clone(),
            slot,
        })
    }

    /// Used internally by a concrete pipe's `execute` to place a result it produced.
    /// Silently drops the candidate if the output slot is already full, matching the
    /// pipeline worker's "outputs not saturated" precondition for calling `execute` at all.
    pub fn push_output(&self, slot: usize, candidate: Candidate) -> PipelineResult<()> {
        self.output_slot(slot)?.push(candidate);
        Ok(())
    }

    pub fn inputs_are_saturated(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(|s| s.is_full())
    }

    pub fn outputs_are_saturated(&self) -> bool {
        self.outputs.iter().any(|s| s.is_full())
    }

    pub fn has_input_available(&self, slot: usize) -> bool {
        self.inputs.get(slot).is_some_and(|s| s.has_items())
    }
}

/// A bounded stage that transforms or produces candidate byte-vectors.
///
/// Concrete kinds own a [`PipeBase`] and forward the slot operations to it; `execute`
/// is the stage-specific behavior invoked once per worker iteration when inputs are
/// saturated and outputs are not.
pub trait Pipe: Send + Sync {
    fn name(&self) -> &str;
    fn input_count(&self) -> usize;
    fn output_count(&self) -> usize;
    fn input_has_space(&self, slot: usize) -> PipelineResult<bool>;
    fn add_input(&self, slot: usize, candidate: Candidate) -> PipelineResult<()>;
    fn draw_input(&self, slot: usize) -> PipelineResult<Candidate>;
    fn has_output(&self, slot: usize) -> PipelineResult<bool>;
    fn draw_output(&self, slot: usize) -> PipelineResult<Candidate>;
    fn inputs_are_saturated(&self) -> bool;
    fn outputs_are_saturated(&self) -> bool;

    /// Runs the pipe's concrete behavior once. Called by a pipeline worker when inputs
    /// are saturated and outputs are not; concrete kinds may also call it standalone.
    fn execute(&self) -> PipelineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_input_fails_past_capacity() {
        let base = PipeBase::new("p", 1, 0, 2);
        base.add_input(0, Candidate::new(vec![1])).unwrap();
        base.add_input(0, Candidate::new(vec![2])).unwrap();
        assert!(matches!(
            base.add_input(0, Candidate::new(vec![3])),
            Err(PipelineError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn draw_input_on_empty_slot_is_underflow() {
        let base = PipeBase::new("p", 1, 0, 2);
        assert!(matches!(base.draw_input(0), Err(PipelineError::Underflow { .. })));
    }

    #[test]
    fn inputs_are_saturated_requires_every_slot_full() {
        let base = PipeBase::new("p", 2, 0, 1);
        assert!(!base.inputs_are_saturated());
        base.add_input(0, Candidate::new(vec![])).unwrap();
        assert!(!base.inputs_are_saturated());
        base.add_input(1, Candidate::new(vec![])).unwrap();
        assert!(base.inputs_are_saturated());
    }

    #[test]
    fn outputs_are_saturated_if_any_slot_full() {
        let base = PipeBase::new("p", 0, 2, 1);
        assert!(!base.outputs_are_saturated());
        base.push_output(0, Candidate::new(vec![])).unwrap();
        assert!(base.outputs_are_saturated());
    }

    #[test]
    fn unknown_slot_is_invalid_argument() {
        let base = PipeBase::new("p", 1, 1, 1);
        assert!(matches!(base.input_has_space(5), Err(PipelineError::InvalidArgument { .. })));
    }
}
