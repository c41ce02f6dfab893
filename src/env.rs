// src/env.rs
//
// Synthetic demo environment: a single-step classification problem over a
// 2-D situation space. Action 0 is rewarded iff dimension 0 exceeds the
// threshold; action 1 is the complement. Used by the CLI harness and the
// end-to-end tests.
//
// The environment is an external collaborator: it owns its own explicitly
// seeded stream for situation sampling, separate from the learning core's
// stream.

use crate::experiment::Environment;
use crate::rng::Pmmlcg;

pub const THRESHOLD_ENV_MAX_PAYOFF: f64 = 1000.0;

/// Threshold classification environment.
#[derive(Debug, Clone)]
pub struct ThresholdEnv {
    rng: Pmmlcg,
    threshold: f64,
    current: Vec<f64>,
    last_correct: bool,
}

impl ThresholdEnv {
    /// Environment with its own explicitly seeded situation stream.
    pub fn new(rng: Pmmlcg) -> Self {
        Self::with_threshold(rng, 0.5)
    }

    pub fn with_threshold(rng: Pmmlcg, threshold: f64) -> Self {
        Self {
            rng,
            threshold,
            current: vec![0.0; 2],
            last_correct: false,
        }
    }

    fn correct_action(&self) -> usize {
        if self.current[0] > self.threshold {
            0
        } else {
            1
        }
    }
}

impl Environment for ThresholdEnv {
    fn reset_state(&mut self) -> Vec<f64> {
        self.current = vec![self.rng.next_f64(), self.rng.next_f64()];
        self.current.clone()
    }

    fn execute_action(&mut self, action: usize) -> f64 {
        self.last_correct = action == self.correct_action();
        if self.last_correct {
            THRESHOLD_ENV_MAX_PAYOFF
        } else {
            0.0
        }
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn was_correct(&self) -> bool {
        self.last_correct
    }

    fn max_payoff(&self) -> f64 {
        THRESHOLD_ENV_MAX_PAYOFF
    }

    fn condition_length(&self) -> usize {
        2
    }
}
