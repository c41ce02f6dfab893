// src/classifier.rs
//
// Macro-classifier: an interval condition, an action, and the learned
// statistics driving credit assignment, deletion and subsumption.
//
// A macro-classifier with numerosity n stands for n identical
// micro-classifiers; duplicates are never stored twice.

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, Encoding};
use crate::config::Config;

/// One rule of the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub condition: Condition,
    /// Action id proposed by this rule.
    pub action: usize,
    /// Predicted payoff p.
    pub prediction: f64,
    /// Absolute prediction error estimate ε.
    pub prediction_error: f64,
    /// Shared fitness F.
    pub fitness: f64,
    /// Number of reinforcement updates received.
    pub experience: u64,
    /// Estimate of the numerosity size of the action sets this rule
    /// participates in.
    pub as_size: f64,
    /// Micro-classifier count represented by this genotype.
    pub numerosity: u32,
    /// Trial index of the last GA application in a set containing this rule.
    pub timestamp: u64,
}

impl Classifier {
    /// Fresh classifier from covering: configured initial statistics,
    /// numerosity 1, experience 0.
    pub fn from_covering(
        cfg: &Config,
        condition: Condition,
        action: usize,
        timestamp: u64,
    ) -> Self {
        Self {
            condition,
            action,
            prediction: cfg.prediction_init,
            prediction_error: cfg.error_init,
            fitness: cfg.fitness_init,
            experience: 0,
            as_size: 1.0,
            numerosity: 1,
            timestamp,
        }
    }

    /// Fresh offspring cloned from a parent: statistics are copied (the GA
    /// discounts them afterwards), experience resets, numerosity is 1.
    /// The parent is unaffected; numerosity is never split.
    pub fn offspring_of(parent: &Classifier) -> Self {
        Self {
            condition: parent.condition.clone(),
            action: parent.action,
            prediction: parent.prediction,
            prediction_error: parent.prediction_error,
            fitness: parent.fitness,
            experience: 0,
            as_size: parent.as_size,
            numerosity: 1,
            timestamp: parent.timestamp,
        }
    }

    pub fn matches(&self, encoding: Encoding, situation: &[f64]) -> bool {
        self.condition.matches(encoding, situation)
    }

    /// Power-law accuracy κ: 1 below the error threshold, else
    /// `alpha * (ε / ε₀)^(-ν)`.
    pub fn accuracy(&self, cfg: &Config) -> f64 {
        if self.prediction_error < cfg.epsilon_0 {
            1.0
        } else {
            cfg.alpha * (self.prediction_error / cfg.epsilon_0).powf(-cfg.nu)
        }
    }

    /// Roulette vote for deletion: `as_size * numerosity`, amplified by
    /// `mean_fitness / (F / n)` once the rule is experienced and its
    /// per-micro fitness falls below `delta * mean_fitness`.
    pub fn deletion_vote(&self, cfg: &Config, mean_fitness: f64) -> f64 {
        let mut vote = self.as_size * self.numerosity as f64;
        let micro_fitness = self.fitness / self.numerosity as f64;
        if self.experience > cfg.theta_del && micro_fitness < cfg.delta * mean_fitness {
            vote *= mean_fitness / micro_fitness;
        }
        vote
    }

    /// Whether this rule is experienced and accurate enough to subsume.
    pub fn is_subsumer(&self, cfg: &Config) -> bool {
        self.experience > cfg.theta_sub && self.prediction_error < cfg.epsilon_0
    }

    /// Whether this rule may absorb `other`: subsumption-eligible, same
    /// action, strictly more general condition.
    pub fn could_subsume(&self, cfg: &Config, other: &Classifier) -> bool {
        self.is_subsumer(cfg)
            && self.action == other.action
            && self.condition.is_more_general(cfg.encoding, &other.condition)
    }

    /// Identical genotype: same stored condition alleles and same action.
    pub fn same_genotype(&self, other: &Classifier) -> bool {
        self.action == other.action && self.condition == other.condition
    }
}
