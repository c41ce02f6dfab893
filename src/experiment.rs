// src/experiment.rs
//
// The discrete control cycle tying matching, covering, prediction, action
// selection, reinforcement and the GA into one experiment:
//
//   SENSE -> MATCH -> COVER* -> PREDICT -> SELECT_ACTION -> ACT
//         -> REINFORCE -> EVOLVE -> SENSE ...
//
// One trial = one environment interaction. Explore/exploit is chosen per
// trial from a training-budget schedule; the GA runs only in explore
// trials. The loop is single-threaded and synchronous; the only suspension
// points are evaluation-window flushes into the sink, which happen in trial
// order.

use crate::config::{Config, ConfigError};
use crate::covering;
use crate::evaluation::{EvalWindow, ExperimentSummary, WindowRecord};
use crate::ga::run_ga;
use crate::matching::MatchSet;
use crate::population::Population;
use crate::prediction::{PredictionArray, SelectionRegime};
use crate::reinforcement::reinforce;
use crate::rng::Pmmlcg;
use crate::telemetry::EvalSink;

/// Contract an environment must fulfil towards the learning core.
///
/// `was_correct` is an evaluation-only oracle: it never feeds learning,
/// only the evaluation windows. `max_payoff` normalizes the system error.
pub trait Environment {
    /// Sample and return the situation for a new trial.
    fn reset_state(&mut self) -> Vec<f64>;
    /// Execute an action against the current situation; returns the reward.
    fn execute_action(&mut self, action: usize) -> f64;
    /// Number of distinct actions.
    fn num_actions(&self) -> usize;
    /// Whether the previously executed action was the correct one.
    fn was_correct(&self) -> bool;
    /// Maximal payoff receivable (error normalization).
    fn max_payoff(&self) -> f64;
    /// Dimensionality of the situation vector.
    fn condition_length(&self) -> usize;
}

/// Per-trial trace exposed for reproducibility checks and verbose output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialOutcome {
    pub trial: u64,
    pub explore: bool,
    pub action: usize,
    pub reward: f64,
    /// Micro-classifier population size after the trial.
    pub population_size: u64,
}

/// One XCSR experiment over an environment.
pub struct Experiment<'a, E: Environment, S: EvalSink> {
    cfg: &'a Config,
    env: E,
    sink: S,
    rng: Pmmlcg,
    population: Population,
    trial: u64,
    explore_trials: u64,
    window: EvalWindow,
    windows: Vec<WindowRecord>,
    covering_ops: u64,
    ga_ops: u64,
}

impl<'a, E: Environment, S: EvalSink> Experiment<'a, E, S> {
    /// Wire up an experiment. Validates the configuration and checks that
    /// the population bound can hold one classifier per action, which the
    /// covering loop relies on.
    pub fn new(
        cfg: &'a Config,
        env: E,
        rng: Pmmlcg,
        sink: S,
        explore_trials: u64,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        if env.num_actions() == 0 {
            return Err(ConfigError::OutOfRange {
                field: "num_actions",
                message: "environment offers no actions".into(),
            });
        }
        if (cfg.max_pop_size as usize) < env.num_actions() {
            return Err(ConfigError::OutOfRange {
                field: "max_pop_size",
                message: format!(
                    "{} cannot cover {} actions",
                    cfg.max_pop_size,
                    env.num_actions()
                ),
            });
        }
        Ok(Self {
            cfg,
            env,
            sink,
            rng,
            population: Population::new(),
            trial: 0,
            explore_trials,
            window: EvalWindow::new(),
            windows: Vec::new(),
            covering_ops: 0,
            ga_ops: 0,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn seed(&self) -> i64 {
        self.rng.initial_seed()
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Evaluation windows flushed so far, in trial order.
    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    /// Run one trial of the control cycle.
    pub fn run_trial(&mut self) -> TrialOutcome {
        let explore = self.trial < self.explore_trials;
        let num_actions = self.env.num_actions();

        // SENSE
        let situation = self.env.reset_state();
        debug_assert_eq!(situation.len(), self.env.condition_length());

        // MATCH + COVER*: loop until every action is represented. Inserting
        // a covering classifier can trigger deletions that uncover other
        // actions, so the match set is rebuilt after every insertion pass.
        let mut match_set = MatchSet::build(&self.population, self.cfg, &situation, num_actions);
        while match_set.has_missing_actions() {
            for action in match_set.missing_actions().collect::<Vec<_>>() {
                let classifier =
                    covering::create(self.cfg, &situation, action, self.trial, &mut self.rng);
                self.population.add(classifier, self.cfg, &mut self.rng);
                self.covering_ops += 1;
            }
            match_set = MatchSet::build(&self.population, self.cfg, &situation, num_actions);
        }
        if match_set.is_empty() {
            // Unreachable by construction; a hit means the covering
            // invariant broke, which is a bug and not a recoverable state.
            debug_assert!(false, "empty match set after covering");
            eprintln!("xcsr: invariant violation: empty match set after covering");
        }

        // PREDICT + SELECT_ACTION
        let prediction_array = PredictionArray::new(&self.population, &match_set, num_actions);
        let regime = if explore {
            SelectionRegime::RouletteWheel
        } else {
            SelectionRegime::BestActionWinner
        };
        let action = prediction_array.select(regime, &mut self.rng);
        let action_set = match_set.action_set(&self.population, action);

        // ACT
        let reward = self.env.execute_action(action);

        // REINFORCE
        reinforce(&mut self.population, &action_set, reward, self.cfg);

        // EVOLVE (explore trials only)
        if explore {
            if run_ga(
                &mut self.population,
                &action_set,
                self.trial,
                num_actions,
                self.cfg,
                &mut self.rng,
            ) {
                self.ga_ops += 1;
            }
            if self.cfg.action_set_subsumption {
                self.population.subsume_classifiers(&action_set, self.cfg);
            }
        }

        // Evaluation bookkeeping. The system error compares the executed
        // action's predicted payoff with the received reward.
        let population_size = self.population.numerosity_sum();
        let system_error =
            (reward - prediction_array.payoff(action)).abs() / self.env.max_payoff();
        self.window
            .push(self.env.was_correct(), system_error, population_size);
        self.trial += 1;
        if self.window.is_full() {
            let record = self.window.flush(self.trial);
            self.sink.record_window(&record);
            self.windows.push(record);
        }

        TrialOutcome {
            trial: self.trial - 1,
            explore,
            action,
            reward,
            population_size,
        }
    }

    /// Run the full trial budget and emit the experiment summary.
    pub fn run(&mut self, trials: u64) -> ExperimentSummary {
        for _ in 0..trials {
            self.run_trial();
        }
        let summary = ExperimentSummary::from_windows(
            self.rng.initial_seed(),
            self.trial,
            &self.windows,
            self.covering_ops,
            self.ga_ops,
        );
        self.sink.record_summary(&summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NoopSink;

    /// Single-step environment with a fixed situation table, for exercising
    /// the loop without the demo environment.
    struct TableEnv {
        situations: Vec<Vec<f64>>,
        cursor: usize,
        current: Vec<f64>,
        last_correct: bool,
    }

    impl TableEnv {
        fn new(situations: Vec<Vec<f64>>) -> Self {
            Self {
                situations,
                cursor: 0,
                current: Vec::new(),
                last_correct: false,
            }
        }
    }

    impl Environment for TableEnv {
        fn reset_state(&mut self) -> Vec<f64> {
            self.current = self.situations[self.cursor % self.situations.len()].clone();
            self.cursor += 1;
            self.current.clone()
        }

        fn execute_action(&mut self, action: usize) -> f64 {
            let correct = usize::from(self.current[0] >= 0.5);
            self.last_correct = action == correct;
            if self.last_correct {
                1000.0
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
            1000.0
        }

        fn condition_length(&self) -> usize {
            2
        }
    }

    fn env() -> TableEnv {
        TableEnv::new(vec![vec![0.2, 0.5], vec![0.7, 0.5], vec![0.4, 0.1]])
    }

    #[test]
    fn covering_fills_every_action_on_the_first_trial() {
        let cfg = Config {
            max_pop_size: 100,
            ..Config::default()
        };
        let rng = Pmmlcg::new(1234).unwrap();
        let mut exp = Experiment::new(&cfg, env(), rng, NoopSink, 10).unwrap();
        exp.run_trial();
        // Both actions were missing initially.
        assert!(exp.covering_ops >= 2);
        assert!(exp.population().numerosity_sum() >= 2);
    }

    #[test]
    fn population_bound_holds_over_many_trials() {
        let cfg = Config {
            max_pop_size: 30,
            ..Config::default()
        };
        let rng = Pmmlcg::new(4321).unwrap();
        let mut exp = Experiment::new(&cfg, env(), rng, NoopSink, 500).unwrap();
        for _ in 0..500 {
            exp.run_trial();
            assert!(exp.population().numerosity_sum() <= cfg.max_pop_size as u64);
        }
    }

    #[test]
    fn windows_flush_every_fifty_trials() {
        let cfg = Config::default();
        let rng = Pmmlcg::new(5).unwrap();
        let mut exp = Experiment::new(&cfg, env(), rng, NoopSink, 100).unwrap();
        let summary = exp.run(120);
        assert_eq!(summary.windows, 2);
        assert_eq!(summary.trials, 120);
        assert_eq!(exp.windows[0].trial, 50);
        assert_eq!(exp.windows[1].trial, 100);
    }

    #[test]
    fn rejects_population_smaller_than_action_count() {
        let cfg = Config {
            max_pop_size: 1,
            ..Config::default()
        };
        let rng = Pmmlcg::new(5).unwrap();
        assert!(Experiment::new(&cfg, env(), rng, NoopSink, 10).is_err());
    }

    #[test]
    fn explore_schedule_switches_to_exploit() {
        let cfg = Config::default();
        let rng = Pmmlcg::new(5).unwrap();
        let mut exp = Experiment::new(&cfg, env(), rng, NoopSink, 3).unwrap();
        let modes: Vec<bool> = (0..6).map(|_| exp.run_trial().explore).collect();
        assert_eq!(modes, vec![true, true, true, false, false, false]);
    }
}
