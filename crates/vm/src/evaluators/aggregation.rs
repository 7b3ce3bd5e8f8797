use super::Evaluator;
use crate::error::{VmError, VmResult};
use crate::session::VmSession;

struct Entry {
    evaluator: Box<dyn Evaluator>,
    weight: f64,
    invert: bool,
}

/// Combines weighted sub-evaluators into one score. Weights are normalized by their sum;
/// an inverted entry contributes `1 - score` instead of `score`.
#[derive(Default)]
pub struct AggregationEvaluator {
    entries: Vec<Entry>,
}

impl AggregationEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_evaluator(&mut self, evaluator: Box<dyn Evaluator>, weight: f64, invert: bool) -> VmResult<()> {
        if weight < 0.0 {
            return Err(VmError::InvalidArgument {
                reason: format!("evaluator weight must be non-negative, got {weight}"),
            });
        }
        self.entries.push(Entry { evaluator, weight, invert });
        Ok(())
    }
}

impl Evaluator for AggregationEvaluator {
    fn evaluate(&self, session: &mut VmSession) -> VmResult<f64> {
        if self.entries.is_empty() {
            return Err(VmError::InvalidState {
                reason: "AggregationEvaluator has no sub-evaluators".to_string(),
            });
        }
        let total_weight: f64 = self.entries.iter().map(|e| e.weight).sum();
        if total_weight == 0.0 {
            return Ok(0.0);
        }
        let mut weighted_sum = 0.0;
        for entry in &self.entries {
            let score = entry.evaluator.evaluate(session)?;
            let contribution = if entry.invert { 1.0 - score } else { score };
            weighted_sum += entry.weight * contribution;
        }
        Ok((weighted_sum / total_weight).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beast_config::SessionLimits;
    use beast_program::Program;

    struct Fixed(f64);
    impl Evaluator for Fixed {
        fn evaluate(&self, _session: &mut VmSession) -> VmResult<f64> {
            Ok(self.0)
        }
    }

    fn session() -> VmSession {
        VmSession::new(Program::new_growing(), SessionLimits::default())
    }

    #[test]
    fn empty_aggregation_is_invalid_state() {
        let mut s = session();
        assert!(matches!(
            AggregationEvaluator::new().evaluate(&mut s),
            Err(VmError::InvalidState { .. })
        ));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut agg = AggregationEvaluator::new();
        assert!(matches!(
            agg.add_evaluator(Box::new(Fixed(0.5)), -1.0, false),
            Err(VmError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn all_inverted_matches_weighted_one_minus_score_formula() {
        let mut agg = AggregationEvaluator::new();
        agg.add_evaluator(Box::new(Fixed(0.2)), 1.0, true).unwrap();
        agg.add_evaluator(Box::new(Fixed(0.8)), 3.0, true).unwrap();
        let mut s = session();
        let expected = (1.0 * (1.0 - 0.2) + 3.0 * (1.0 - 0.8)) / 4.0;
        assert!((agg.evaluate(&mut s).unwrap() - expected).abs() < 1e-9);
    }
}
