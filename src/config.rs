// src/config.rs
//
// Central configuration for the XCSR learning core.
//
// One immutable value carries every hyperparameter; it is passed by
// reference into each component at construction or call time. There is no
// global parameter state, so independent experiments with different
// configurations can coexist in one process.
//
// Parameter names follow the algorithmic description of XCS
// (Butz & Wilson, "An Algorithmic Description of XCS").

use serde::{Deserialize, Serialize};

use crate::condition::Encoding;

/// Immutable hyperparameter set for one experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximal number of micro-classifiers in the population (Σ numerosity).
    pub max_pop_size: u32,

    /// Lower bound of the problem space (inclusive).
    pub min_phenotype: f64,
    /// Upper bound of the problem space (exclusive for matching).
    pub max_phenotype: f64,

    /// Active condition-allele encoding, chosen once per experiment.
    pub encoding: Encoding,

    /// Learning rate for prediction, error, fitness and set-size estimates.
    pub beta: f64,
    /// Fall-off factor in the accuracy power function.
    pub alpha: f64,
    /// Exponent in the accuracy power function.
    pub nu: f64,
    /// Error threshold under which a classifier counts as fully accurate.
    pub epsilon_0: f64,

    /// Mean action-set period (in trials) between GA invocations.
    pub theta_ga: f64,
    /// Experience threshold for deletion-vote amplification.
    pub theta_del: u64,
    /// Experience threshold for acting as a subsumer.
    pub theta_sub: u64,
    /// Fraction of the population mean fitness below which a classifier's
    /// deletion vote is amplified.
    pub delta: f64,

    /// Probability of applying crossover to a pair of offspring.
    pub p_crossover: f64,
    /// Probability of mutating one allele value (and the action).
    pub p_mutation: f64,
    /// Probability of a don't-care allele during covering.
    pub p_dont_care: f64,

    /// Prediction-error discount applied to GA offspring.
    pub error_reduction: f64,
    /// Fitness discount applied to GA offspring.
    pub fitness_reduction: f64,

    /// Initial prediction of a fresh classifier.
    pub prediction_init: f64,
    /// Initial prediction error of a fresh classifier.
    pub error_init: f64,
    /// Initial fitness of a fresh classifier.
    pub fitness_init: f64,

    /// Maximal covering spread per endpoint for the bound encodings (r_ob).
    pub covering_range: f64,
    /// Maximal covering spread for the center-spread encoding (s_0).
    pub covering_spread: f64,
    /// Maximal mutation magnitude for the bound encodings (m_ob).
    pub mutation_bound: f64,
    /// Maximal mutation magnitude for the center-spread encoding (m_cs).
    pub mutation_spread: f64,

    /// Apply population subsumption over the action set after reinforcement
    /// in explore trials.
    pub action_set_subsumption: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pop_size: 6000,
            min_phenotype: 0.0,
            max_phenotype: 1.0,
            encoding: Encoding::UnorderedBound,
            beta: 0.2,
            alpha: 0.1,
            nu: 5.0,
            epsilon_0: 10.0,
            theta_ga: 5.0,
            theta_del: 20,
            theta_sub: 20,
            delta: 0.1,
            p_crossover: 0.3,
            p_mutation: 0.05,
            p_dont_care: 0.0,
            error_reduction: 0.25,
            fitness_reduction: 0.1,
            prediction_init: 10.0,
            error_init: 0.0,
            fitness_init: 0.01,
            covering_range: 0.2,
            covering_spread: 0.2,
            mutation_bound: 0.2,
            mutation_spread: 0.1,
            action_set_subsumption: false,
        }
    }
}

/// Errors raised by configuration validation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    OutOfRange {
        field: &'static str,
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::OutOfRange { field, message } => {
                write!(f, "config field '{}' out of range: {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Validate the hyperparameter set. Components assume a validated
    /// config; the experiment constructor calls this once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn reject(field: &'static str, message: String) -> Result<(), ConfigError> {
            Err(ConfigError::OutOfRange { field, message })
        }

        if self.max_pop_size == 0 {
            return reject("max_pop_size", "must be positive".into());
        }
        if !(self.min_phenotype < self.max_phenotype) {
            return reject(
                "min_phenotype",
                format!(
                    "phenotype range [{}, {}) is empty",
                    self.min_phenotype, self.max_phenotype
                ),
            );
        }
        if !(self.beta > 0.0 && self.beta <= 1.0) {
            return reject("beta", format!("{} not in (0, 1]", self.beta));
        }
        if !(self.alpha > 0.0) {
            return reject("alpha", format!("{} must be positive", self.alpha));
        }
        if !(self.nu > 0.0) {
            return reject("nu", format!("{} must be positive", self.nu));
        }
        if !(self.epsilon_0 > 0.0) {
            return reject("epsilon_0", format!("{} must be positive", self.epsilon_0));
        }
        if !(self.delta > 0.0 && self.delta < 1.0) {
            return reject("delta", format!("{} not in (0, 1)", self.delta));
        }
        for (field, value) in [
            ("p_crossover", self.p_crossover),
            ("p_mutation", self.p_mutation),
            ("p_dont_care", self.p_dont_care),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return reject(field, format!("{} not in [0, 1]", value));
            }
        }
        for (field, value) in [
            ("error_reduction", self.error_reduction),
            ("fitness_reduction", self.fitness_reduction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return reject(field, format!("{} not in (0, 1]", value));
            }
        }
        if !(self.fitness_init > 0.0) {
            return reject(
                "fitness_init",
                format!("{} must be positive", self.fitness_init),
            );
        }
        if self.error_init < 0.0 {
            return reject(
                "error_init",
                format!("{} must be non-negative", self.error_init),
            );
        }
        for (field, value) in [
            ("covering_range", self.covering_range),
            ("covering_spread", self.covering_spread),
            ("mutation_bound", self.mutation_bound),
            ("mutation_spread", self.mutation_spread),
        ] {
            if !(value > 0.0) {
                return reject(field, format!("{} must be positive", value));
            }
        }
        Ok(())
    }
}
