// src/evaluation.rs
//
// Rolling evaluation windows and end-of-experiment summaries.
//
// Every trial contributes (was the oracle satisfied, |reward - predicted
// payoff| normalized by the environment's maximal payoff, micro-classifier
// population size) to the current window. A full window flushes one record;
// the experiment summary aggregates mean, standard deviation and a 95%
// confidence interval per metric across all complete windows.

use serde::{Deserialize, Serialize};

/// Trials per evaluation window.
pub const EVAL_WINDOW: usize = 50;

/// One flushed evaluation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Trial index at which the window completed.
    pub trial: u64,
    /// Fraction of trials the oracle judged correct.
    pub fraction_correct: f64,
    /// Mean absolute system error, normalized by the maximal payoff.
    pub system_error: f64,
    /// Mean micro-classifier population size.
    pub avg_population_size: f64,
}

/// Accumulator for the current window.
#[derive(Debug, Clone, Default)]
pub struct EvalWindow {
    correct: u32,
    error_sum: f64,
    pop_size_sum: f64,
    trials: usize,
}

impl EvalWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trial. A NaN system error (the executed action had no
    /// proposer in a degenerate draw) is excluded explicitly rather than
    /// coerced to zero.
    pub fn push(&mut self, was_correct: bool, system_error: f64, population_size: u64) {
        self.trials += 1;
        if was_correct {
            self.correct += 1;
        }
        if system_error.is_finite() {
            self.error_sum += system_error;
        }
        self.pop_size_sum += population_size as f64;
    }

    pub fn is_full(&self) -> bool {
        self.trials >= EVAL_WINDOW
    }

    /// Flush into a record and reset the accumulator.
    pub fn flush(&mut self, trial: u64) -> WindowRecord {
        let n = self.trials.max(1) as f64;
        let record = WindowRecord {
            trial,
            fraction_correct: self.correct as f64 / n,
            system_error: self.error_sum / n,
            avg_population_size: self.pop_size_sum / n,
        };
        *self = Self::default();
        record
    }
}

/// Mean, spread and 95% confidence interval of one metric across windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStat {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

impl SummaryStat {
    fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                mean: f64::NAN,
                std_dev: f64::NAN,
                ci_low: f64::NAN,
                ci_high: f64::NAN,
            };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        if n == 1 {
            return Self {
                mean,
                std_dev: 0.0,
                ci_low: mean,
                ci_high: mean,
            };
        }
        let variance =
            samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n as f64 - 1.0);
        let std_dev = variance.sqrt();
        let half_width = t_critical_95(n - 1) * std_dev / (n as f64).sqrt();
        Self {
            mean,
            std_dev,
            ci_low: mean - half_width,
            ci_high: mean + half_width,
        }
    }
}

/// Two-sided 95% Student-t critical value for the given degrees of freedom.
fn t_critical_95(dof: usize) -> f64 {
    const TABLE: [f64; 30] = [
        12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179,
        2.160, 2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064,
        2.060, 2.056, 2.052, 2.048, 2.045, 2.042,
    ];
    match dof {
        0 => f64::INFINITY,
        1..=30 => TABLE[dof - 1],
        31..=60 => 2.0,
        _ => 1.96,
    }
}

/// End-of-experiment aggregate across all complete windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Seed of the learning stream (logged for reproducibility).
    pub seed: i64,
    /// Total trials executed.
    pub trials: u64,
    /// Complete windows that entered the aggregation.
    pub windows: usize,
    pub fraction_correct: SummaryStat,
    pub system_error: SummaryStat,
    pub avg_population_size: SummaryStat,
    /// Covering operator invocations.
    pub covering_ops: u64,
    /// GA invocations that produced inserted offspring.
    pub ga_ops: u64,
}

impl ExperimentSummary {
    pub fn from_windows(
        seed: i64,
        trials: u64,
        windows: &[WindowRecord],
        covering_ops: u64,
        ga_ops: u64,
    ) -> Self {
        let collect = |f: fn(&WindowRecord) -> f64| -> Vec<f64> { windows.iter().map(f).collect() };
        Self {
            seed,
            trials,
            windows: windows.len(),
            fraction_correct: SummaryStat::from_samples(&collect(|w| w.fraction_correct)),
            system_error: SummaryStat::from_samples(&collect(|w| w.system_error)),
            avg_population_size: SummaryStat::from_samples(&collect(|w| w.avg_population_size)),
            covering_ops,
            ga_ops,
        }
    }
}
