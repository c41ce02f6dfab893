//! XCSR core library.
//!
//! This crate implements a real-valued extended classifier system: an
//! online, accuracy-based evolutionary reinforcement-learning engine that
//! learns a bounded population of interval-conditioned rules from
//! environment feedback. The binary (`src/main.rs`) is just a thin research
//! harness around these components.
//!
//! # Architecture
//!
//! - **Condition / Encoding** (`condition`): three real-valued allele
//!   encodings (ordered-bound, unordered-bound, center-spread) behind one
//!   tagged variant selected per experiment.
//! - **Population** (`population`): arena-backed, bounded in
//!   micro-classifiers, with roulette deletion and subsumption merging.
//! - **Discovery** (`covering`, `ga`): covering for uncovered actions and
//!   a niche GA per action set.
//! - **Credit assignment** (`reinforcement`): Widrow-Hoff / MAM updates
//!   with power-law accuracy and fitness sharing.
//! - **Experiment** (`experiment`): the SENSE..EVOLVE control cycle over an
//!   `Environment`, feeding rolling evaluation windows into an `EvalSink`.
//!
//! All randomness flows through one explicitly seeded Park-Miller stream
//! (`rng`); identical seeds reproduce bit-identical trajectories.

pub mod classifier;
pub mod condition;
pub mod config;
pub mod covering;
pub mod env;
pub mod evaluation;
pub mod experiment;
pub mod ga;
pub mod matching;
pub mod population;
pub mod prediction;
pub mod reinforcement;
pub mod rng;
pub mod telemetry;

// --- Re-exports for ergonomic external use ---------------------------------

pub use classifier::Classifier;
pub use condition::{Condition, Encoding, Interval};
pub use config::{Config, ConfigError};
pub use env::ThresholdEnv;
pub use evaluation::{EvalWindow, ExperimentSummary, SummaryStat, WindowRecord, EVAL_WINDOW};
pub use experiment::{Environment, Experiment, TrialOutcome};
pub use ga::run_ga;
pub use matching::MatchSet;
pub use population::{ClassifierId, Population};
pub use prediction::{PredictionArray, SelectionRegime};
pub use reinforcement::reinforce;
pub use rng::{Pmmlcg, SeedError, EXPERIMENT_SEEDS};
pub use telemetry::{EvalSink, JsonlSink, NoopSink};

// --- Crate-level smoke tests ------------------------------------------------
