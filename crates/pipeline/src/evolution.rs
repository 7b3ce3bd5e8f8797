//! [`EvolutionPipe`]: wraps a genetic-algorithm [`Recombinator`] over byte-vector
//! candidates, scored by an injected [`CandidateFitness`].

use std::panic::{catch_unwind, AssertUnwindSafe};

use beast_config::{EvolutionParameters, SessionLimits};
use beast_vm::{CpuVirtualMachine, Evaluator, MessageSeverity, VmSession};
use rand::Rng;

use crate::error::PipelineResult;
use crate::pipe::{Pipe, PipeBase};
use crate::Candidate;

/// Scores a raw candidate byte-vector. Exceptions/failures during evaluation are the
/// implementor's responsibility to downgrade to `0.0`, matching the pipe-level contract
/// that a candidate's fitness is never allowed to fail evolution outright.
pub trait CandidateFitness: Send + Sync {
    fn evaluate(&self, bytes: &[u8]) -> f64;
}

/// Runs a candidate's bytes as a program through a fresh session and the injected
/// [`Evaluator`], scoring `0.0` on any VM failure (malformed or ill-behaved evolved
/// programs are expected, not exceptional).
pub struct ProgramFitness<E> {
    limits: SessionLimits,
    evaluator: E,
    max_steps: u32,
}

impl<E: Evaluator> ProgramFitness<E> {
    pub fn new(limits: SessionLimits, evaluator: E, max_steps: u32) -> Self {
        Self {
            limits,
            evaluator,
            max_steps,
        }
    }
}

impl<E: Evaluator + Send + Sync> CandidateFitness for ProgramFitness<E> {
    fn evaluate(&self, bytes: &[u8]) -> f64 {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let program = beast_program::Program::from_bytes(bytes.to_vec());
            let mut session = VmSession::new(program, self.limits);
            let vm = CpuVirtualMachine::new(MessageSeverity::Panic);
            let mut steps = 0u32;
            loop {
                match vm.step(&mut session, false) {
                    Ok(true) => {
                        steps += 1;
                        if steps >= self.max_steps {
                            break;
                        }
                    }
                    Ok(false) => break,
                    Err(_) => return 0.0,
                }
            }
            self.evaluator.evaluate(&mut session).unwrap_or(0.0)
        }));
        outcome.unwrap_or(0.0).clamp(0.0, 1.0)
    }
}

/// A pluggable byte-vector recombinator, parameterized by [`EvolutionParameters`] and a
/// fitness function. The genetic algorithm itself is swappable; [`SimpleGeneticAlgorithm`]
/// is the built-in implementation.
pub trait Recombinator: Send + Sync {
    fn evolve(&self, population: Vec<Vec<u8>>, params: &EvolutionParameters, fitness: &dyn Fn(&[u8]) -> f64) -> Vec<(Vec<u8>, f64)>;
}

/// Tournament-selected, single-point crossover, bit-flip mutation genetic algorithm over
/// flat byte vectors. When parents differ in length, crossover and mutation points are
/// taken modulo the shorter parent so every offspring byte index stays in bounds.
#[derive(Default)]
pub struct SimpleGeneticAlgorithm;

impl SimpleGeneticAlgorithm {
    fn tournament_select<'a>(&self, scored: &'a [(Vec<u8>, f64)], rng: &mut impl Rng) -> &'a Vec<u8> {
        let a = &scored[rng.gen_range(0..scored.len())];
        let b = &scored[rng.gen_range(0..scored.len())];
        if a.1 >= b.1 {
            &a.0
        } else {
            &b.0
        }
    }

    fn crossover(&self, a: &[u8], b: &[u8], params: &EvolutionParameters, rng: &mut impl Rng) -> Vec<u8> {
        if a.is_empty() || b.is_empty() || !rng.gen_bool(params.crossover_probability as f64) {
            return a.to_vec();
        }
        let shorter = a.len().min(b.len());
        let point = rng.gen_range(0..shorter);
        let mut child = a[..point].to_vec();
        child.extend_from_slice(&b[point..]);
        child
    }

    fn mutate(&self, individual: &mut [u8], params: &EvolutionParameters, rng: &mut impl Rng) {
        for byte in individual.iter_mut() {
            if rng.gen_bool(params.mutation_probability as f64) {
                *byte ^= 1 << rng.gen_range(0..8);
            }
        }
    }
}

impl Recombinator for SimpleGeneticAlgorithm {
    fn evolve(
        &self,
        population: Vec<Vec<u8>>,
        params: &EvolutionParameters,
        fitness: &dyn Fn(&[u8]) -> f64,
    ) -> Vec<(Vec<u8>, f64)> {
        if population.is_empty() {
            return Vec::new();
        }
        let mut rng = rand::thread_rng();
        let mut scored: Vec<(Vec<u8>, f64)> = population.into_iter().map(|bytes| {
            let score = fitness(&bytes);
            (bytes, score)
        }).collect();

        for _ in 0..params.num_generations {
            let target = params.population_size.max(1) as usize;
            let mut next_generation = Vec::with_capacity(target);
            while next_generation.len() < target {
                let parent_a = self.tournament_select(&scored, &mut rng);
                let parent_b = self.tournament_select(&scored, &mut rng);
                let mut child = self.crossover(parent_a, parent_b, params, &mut rng);
                self.mutate(&mut child, params, &mut rng);
                let score = fitness(&child);
                next_generation.push((child, score));
            }
            scored = next_generation;
        }
        scored
    }
}

/// Evolves the byte-vectors queued on its single input slot into a fresh population via
/// an injected [`Recombinator`] and [`CandidateFitness`], emitting every final individual
/// whose fitness clears `cut_off_score` on its single output slot.
pub struct EvolutionPipe {
    base: PipeBase,
    recombinator: Box<dyn Recombinator>,
    fitness: Box<dyn CandidateFitness>,
    params: EvolutionParameters,
}

impl EvolutionPipe {
    pub fn new(
        name: impl Into<String>,
        max_candidates: usize,
        params: EvolutionParameters,
        recombinator: Box<dyn Recombinator>,
        fitness: Box<dyn CandidateFitness>,
    ) -> Self {
        Self {
            base: PipeBase::new(name, 1, 1, max_candidates),
            recombinator,
            fitness,
            params,
        }
    }
}

impl Pipe for EvolutionPipe {
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
        let mut population = Vec::new();
        while self.base.has_input_available(0) {
            population.push(self.base.draw_input(0)?.bytes);
        }
        if population.is_empty() {
            return Ok(());
        }
        let fitness_fn = |bytes: &[u8]| self.fitness.evaluate(bytes);
        let finalists = self.recombinator.evolve(population, &self.params, &fitness_fn);
        for (bytes, score) in finalists {
            if score >= self.params.cut_off_score {
                self.base.push_output(0, Candidate::scored(bytes, score))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beast_vm::OperatorUsageEvaluator;

    struct CountOnes;
    impl CandidateFitness for CountOnes {
        fn evaluate(&self, bytes: &[u8]) -> f64 {
            if bytes.is_empty() {
                return 0.0;
            }
            bytes.iter().map(|b| b.count_ones() as f64).sum::<f64>() / (bytes.len() as f64 * 8.0)
        }
    }

    #[test]
    fn evolve_improves_or_holds_best_fitness() {
        let ga = SimpleGeneticAlgorithm;
        let fitness = CountOnes;
        let params = EvolutionParameters {
            population_size: 20,
            num_generations: 15,
            mutation_probability: 0.05,
            crossover_probability: 0.7,
            cut_off_score: 0.0,
        };
        let population: Vec<Vec<u8>> = (0..20).map(|_| vec![0u8; 8]).collect();
        let fitness_fn = |b: &[u8]| fitness.evaluate(b);
        let result = ga.evolve(population, &params, &fitness_fn);
        let best = result.iter().map(|(_, s)| *s).fold(0.0, f64::max);
        assert!(best > 0.0, "mutation should have flipped at least one bit across 15 generations");
    }

    #[test]
    fn execute_emits_only_finalists_at_or_above_cutoff() {
        let params = EvolutionParameters {
            population_size: 4,
            num_generations: 1,
            mutation_probability: 0.0,
            crossover_probability: 0.0,
            cut_off_score: 1.0,
        };
        let pipe = EvolutionPipe::new(
            "evo",
            10,
            params,
            Box::new(SimpleGeneticAlgorithm),
            Box::new(CountOnes),
        );
        pipe.add_input(0, Candidate::new(vec![0u8; 4])).unwrap();
        pipe.execute().unwrap();
        assert!(!pipe.has_output(0).unwrap(), "an all-zero candidate never clears a 1.0 cutoff");
    }

    #[test]
    fn program_fitness_scores_zero_on_malformed_bytecode() {
        let fitness = ProgramFitness::new(SessionLimits::default(), OperatorUsageEvaluator::no_op(), 100);
        assert_eq!(fitness.evaluate(&[0xff]), 0.0);
    }
}
