// src/prediction.rs
//
// Prediction array and action selection.
//
// The payoff of an action is the fitness-weighted mean prediction over the
// match-set members proposing it. Actions nobody proposes carry NaN, and
// NaN propagates: every selection regime filters it explicitly instead of
// coercing it to zero.

use serde::{Deserialize, Serialize};

use crate::matching::MatchSet;
use crate::population::Population;
use crate::rng::Pmmlcg;

/// How the action to execute is drawn from the prediction array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionRegime {
    /// Argmax over non-NaN payoffs, first-seen tie-break (exploit).
    BestActionWinner,
    /// Payoff-proportionate draw over non-NaN entries (explore).
    RouletteWheel,
    /// Uniform draw among actions with a non-NaN payoff.
    Random,
}

/// Fitness-weighted payoff per action.
#[derive(Debug, Clone)]
pub struct PredictionArray {
    payoffs: Vec<f64>,
}

impl PredictionArray {
    /// Aggregate `Σ(p·F) / Σ(F)` per action over the match set.
    pub fn new(population: &Population, match_set: &MatchSet, num_actions: usize) -> Self {
        let mut weighted = vec![0.0_f64; num_actions];
        let mut fitness_sum = vec![0.0_f64; num_actions];

        for &id in match_set.members() {
            if let Some(cl) = population.get(id) {
                weighted[cl.action] += cl.prediction * cl.fitness;
                fitness_sum[cl.action] += cl.fitness;
            }
        }

        let payoffs = weighted
            .iter()
            .zip(&fitness_sum)
            .map(|(&pf, &f)| if f > 0.0 { pf / f } else { f64::NAN })
            .collect();
        Self { payoffs }
    }

    pub fn payoffs(&self) -> &[f64] {
        &self.payoffs
    }

    pub fn payoff(&self, action: usize) -> f64 {
        self.payoffs[action]
    }

    /// Choose the action to execute under the given regime.
    pub fn select(&self, regime: SelectionRegime, rng: &mut Pmmlcg) -> usize {
        match regime {
            SelectionRegime::BestActionWinner => self.best_action(),
            SelectionRegime::RouletteWheel => self.roulette_action(rng),
            SelectionRegime::Random => self.random_action(rng),
        }
    }

    fn best_action(&self) -> usize {
        let mut best: Option<(usize, f64)> = None;
        for (action, &payoff) in self.payoffs.iter().enumerate() {
            if payoff.is_nan() {
                continue;
            }
            // Strictly greater keeps the first-seen winner on ties.
            if best.map(|(_, p)| payoff > p).unwrap_or(true) {
                best = Some((action, payoff));
            }
        }
        best.map(|(action, _)| action).unwrap_or(0)
    }

    fn roulette_action(&self, rng: &mut Pmmlcg) -> usize {
        let bid_sum: f64 = self.payoffs.iter().filter(|p| !p.is_nan()).sum();
        if bid_sum == 0.0 {
            return 0;
        }

        let choice_point = bid_sum * rng.next_f64();
        let mut accumulated = 0.0;
        let mut chosen = 0;
        for (action, &payoff) in self.payoffs.iter().enumerate() {
            if !payoff.is_nan() {
                accumulated += payoff;
            }
            if accumulated >= choice_point {
                chosen = action;
                break;
            }
            chosen = action;
        }
        chosen
    }

    fn random_action(&self, rng: &mut Pmmlcg) -> usize {
        let candidates: Vec<usize> = self
            .payoffs
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_nan())
            .map(|(action, _)| action)
            .collect();
        debug_assert!(
            !candidates.is_empty(),
            "random selection over an all-NaN prediction array"
        );
        if candidates.is_empty() {
            return 0;
        }
        candidates[rng.next_below(candidates.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::condition::{Condition, Interval};
    use crate::config::Config;
    use crate::matching::MatchSet;

    fn population_with(
        cfg: &Config,
        specs: &[(usize, f64, f64)], // (action, prediction, fitness)
    ) -> (Population, MatchSet) {
        let mut pop = Population::new();
        let mut rng = Pmmlcg::new(17).unwrap();
        for (i, &(action, prediction, fitness)) in specs.iter().enumerate() {
            // Shift the interval so genotypes stay distinct.
            let lo = i as f64 * 1e-6;
            let mut cl = Classifier::from_covering(
                cfg,
                Condition::new(vec![Interval::new(lo, 1.0)]),
                action,
                0,
            );
            cl.prediction = prediction;
            cl.fitness = fitness;
            pop.add(cl, cfg, &mut rng);
        }
        let ms = MatchSet::build(&pop, cfg, &[0.5], 3);
        (pop, ms)
    }

    #[test]
    fn payoff_is_fitness_weighted_mean() {
        let cfg = Config::default();
        let (pop, ms) = population_with(&cfg, &[(0, 100.0, 1.0), (0, 200.0, 3.0)]);
        let pa = PredictionArray::new(&pop, &ms, 3);
        // (100*1 + 200*3) / 4 = 175
        assert!((pa.payoff(0) - 175.0).abs() < 1e-9);
    }

    #[test]
    fn unproposed_actions_carry_nan() {
        let cfg = Config::default();
        let (pop, ms) = population_with(&cfg, &[(0, 100.0, 1.0)]);
        let pa = PredictionArray::new(&pop, &ms, 3);
        assert!(!pa.payoff(0).is_nan());
        assert!(pa.payoff(1).is_nan());
        assert!(pa.payoff(2).is_nan());
    }

    #[test]
    fn best_action_ignores_nan_and_breaks_ties_first_seen() {
        let cfg = Config::default();
        let (pop, ms) = population_with(&cfg, &[(1, 50.0, 1.0), (2, 50.0, 1.0)]);
        let pa = PredictionArray::new(&pop, &ms, 3);
        // Action 0 is NaN; actions 1 and 2 tie at 50 -> first seen wins.
        assert_eq!(pa.select(SelectionRegime::BestActionWinner, &mut Pmmlcg::new(1).unwrap()), 1);
    }

    #[test]
    fn roulette_returns_zero_on_zero_bid_sum() {
        let cfg = Config::default();
        let (pop, ms) = population_with(&cfg, &[(1, 0.0, 1.0)]);
        let pa = PredictionArray::new(&pop, &ms, 3);
        let mut rng = Pmmlcg::new(2).unwrap();
        assert_eq!(pa.select(SelectionRegime::RouletteWheel, &mut rng), 0);
    }

    #[test]
    fn roulette_prefers_high_payoff_actions() {
        let cfg = Config::default();
        let (pop, ms) = population_with(&cfg, &[(0, 10.0, 1.0), (1, 990.0, 1.0)]);
        let pa = PredictionArray::new(&pop, &ms, 2);
        let mut rng = Pmmlcg::new(33).unwrap();
        let mut hits = [0u32; 2];
        for _ in 0..1000 {
            hits[pa.select(SelectionRegime::RouletteWheel, &mut rng)] += 1;
        }
        assert!(hits[1] > hits[0] * 10, "roulette hits: {:?}", hits);
    }

    #[test]
    fn random_regime_only_picks_proposed_actions() {
        let cfg = Config::default();
        let (pop, ms) = population_with(&cfg, &[(1, 10.0, 1.0), (2, 20.0, 1.0)]);
        let pa = PredictionArray::new(&pop, &ms, 3);
        let mut rng = Pmmlcg::new(9).unwrap();
        for _ in 0..200 {
            let action = pa.select(SelectionRegime::Random, &mut rng);
            assert!(action == 1 || action == 2);
        }
    }
}
