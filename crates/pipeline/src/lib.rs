//! # BEAST pipe fabric
//!
//! Bounded-slot stages ([`pipe::Pipe`]) wired into a [`pipeline::Pipeline`] and driven by
//! one cooperative OS thread per stage. Candidate programs flow as raw byte-vectors from
//! [`factory::ProgramFactoryPipe`] through [`evolution::EvolutionPipe`] stages to a
//! [`sink::NullSinkPipe`] or another consumer.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use beast_config::SessionLimits;
//! use beast_pipeline::{NullSinkPipe, Pipeline, ProgramFactoryPipe};
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.add_pipe("factory", Arc::new(ProgramFactoryPipe::random("factory", 4, 16, SessionLimits::default()))).unwrap();
//! pipeline.add_pipe("sink", Arc::new(NullSinkPipe::new("sink", 4))).unwrap();
//! pipeline.connect("factory", 0, "sink", 0, 4).unwrap();
//! ```

/// A candidate program flowing through the fabric: raw bytes plus its last-assigned score.
pub mod candidate;
/// The evolution stage: a pluggable genetic-algorithm [`Recombinator`](evolution::Recombinator)
/// over byte-vector candidates.
pub mod evolution;
/// Pipeline-wide error and result types.
pub mod error;
/// The random-program synthesis stage.
pub mod factory;
/// The bounded-slot [`Pipe`](pipe::Pipe) trait and its shared FIFO storage.
pub mod pipe;
/// Named pipes wired by directed connections, driven by cooperative worker threads.
pub mod pipeline;
/// The terminal, discard-everything stage.
pub mod sink;

pub use candidate::Candidate;
pub use error::{PipelineError, PipelineResult};
pub use evolution::{CandidateFitness, EvolutionPipe, ProgramFitness, Recombinator, SimpleGeneticAlgorithm};
pub use factory::{ProgramFactory, ProgramFactoryPipe, RandomProgramFactory};
pub use pipe::{Pipe, PipeBase};
pub use pipeline::Pipeline;
pub use sink::NullSinkPipe;
