//! Configuration types for BEAST sessions, evolution pipes, and pipeline connections.
//!
//! These are plain, serde-(de)serializable value types with no file-backed persistence
//! or environment/CLI parsing — configuration sources outside the running process are
//! out of scope for this crate.

use serde::{Deserialize, Serialize};

/// Environmental limits a [`VmSession`](../beast_vm/struct.VmSession.html) enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLimits {
    /// Number of addressable variable slots, `0 ≤ i < variable_count`.
    pub variable_count: u32,
    /// Number of addressable string table slots, `0 ≤ i < string_table_count`.
    pub string_table_count: u32,
    /// Maximum byte length of a single string table entry.
    pub max_string_size: u32,
    /// Maximum byte length of the print buffer. `None` means unbounded.
    pub max_print_buffer_size: Option<u32>,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            variable_count: 1024,
            string_table_count: 64,
            max_string_size: 1024,
            max_print_buffer_size: None,
        }
    }
}

/// Parameters governing an `EvolutionPipe`'s genetic-algorithm recombinator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionParameters {
    /// Target population size; defaults to the owning pipe's `max_candidates`.
    pub population_size: u32,
    pub num_generations: u32,
    pub mutation_probability: f32,
    pub crossover_probability: f32,
    /// Minimum fitness for a final-generation individual to be emitted as a finalist.
    pub cut_off_score: f64,
}

impl EvolutionParameters {
    /// Builds parameters sized to a pipe's candidate capacity, with the documented defaults
    /// for everything else.
    pub fn for_population(population_size: u32) -> Self {
        Self {
            population_size,
            ..Self::default()
        }
    }
}

impl Default for EvolutionParameters {
    fn default() -> Self {
        Self {
            population_size: 10,
            num_generations: 10,
            mutation_probability: 0.001,
            crossover_probability: 0.5,
            cut_off_score: 0.0,
        }
    }
}

/// Per-connection configuration between two pipe slots in a `Pipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// FIFO capacity of the connection's inter-pipe buffer.
    pub buffer_size: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { buffer_size: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evolution_parameters_defaults_match_spec() {
        let params = EvolutionParameters::default();
        assert_eq!(params.num_generations, 10);
        assert_eq!(params.mutation_probability, 0.001);
        assert_eq!(params.crossover_probability, 0.5);
        assert_eq!(params.cut_off_score, 0.0);
    }

    #[test]
    fn session_limits_round_trip_through_json() {
        let limits = SessionLimits::default();
        let json = serde_json::to_string(&limits).unwrap();
        let back: SessionLimits = serde_json::from_str(&json).unwrap();
        assert_eq!(limits, back);
    }

    #[test]
    fn for_population_overrides_only_population_size() {
        let params = EvolutionParameters::for_population(42);
        assert_eq!(params.population_size, 42);
        assert_eq!(params.num_generations, EvolutionParameters::default().num_generations);
    }
}
