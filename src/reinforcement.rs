// src/reinforcement.rs
//
// Credit assignment on the executed action set.
//
// Per-classifier step order is a correctness contract:
//   1. experience += 1
//   2. action-set-size estimate toward the set's numerosity sum
//   3. prediction error toward |r - p|, using the pre-update prediction
//   4. prediction toward r
// then, over the whole set:
//   5-7. power-law accuracy, fitness sharing within the niche, F update.
//
// Estimates use the MAM scheme: while experience < 1/beta the update is the
// running incremental average, afterwards the Widrow-Hoff form with rate
// beta. Updating the prediction before the error would bias the error
// estimate; the order above keeps it unbiased.

use crate::config::Config;
use crate::population::{ClassifierId, Population};

/// Apply one reinforcement step to the action set for reward `reward`.
pub fn reinforce(
    population: &mut Population,
    action_set: &[ClassifierId],
    reward: f64,
    cfg: &Config,
) {
    if action_set.is_empty() {
        return;
    }

    let set_numerosity: f64 = action_set
        .iter()
        .filter_map(|&id| population.get(id))
        .map(|cl| cl.numerosity as f64)
        .sum();

    // Steps 1-4, per classifier.
    for &id in action_set {
        let Some(cl) = population.get_mut(id) else {
            continue;
        };

        cl.experience += 1;
        let experience = cl.experience as f64;
        let young = experience < 1.0 / cfg.beta;

        cl.as_size = if young {
            (cl.as_size * (experience - 1.0) + set_numerosity) / experience
        } else {
            cl.as_size + cfg.beta * (set_numerosity - cl.as_size)
        };

        let abs_error = (reward - cl.prediction).abs();
        cl.prediction_error = if young {
            (cl.prediction_error * (experience - 1.0) + abs_error) / experience
        } else {
            cl.prediction_error + cfg.beta * (abs_error - cl.prediction_error)
        };

        cl.prediction = if young {
            (cl.prediction * (experience - 1.0) + reward) / experience
        } else {
            cl.prediction + cfg.beta * (reward - cl.prediction)
        };
    }

    // Steps 5-7: fitness sharing over the niche.
    let accuracy_sum: f64 = action_set
        .iter()
        .filter_map(|&id| population.get(id))
        .map(|cl| cl.accuracy(cfg) * cl.numerosity as f64)
        .sum();
    if accuracy_sum <= 0.0 {
        return;
    }

    for &id in action_set {
        let Some(cl) = population.get_mut(id) else {
            continue;
        };
        let relative_accuracy = cl.accuracy(cfg) * cl.numerosity as f64 / accuracy_sum;
        cl.fitness += cfg.beta * (relative_accuracy - cl.fitness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::condition::{Condition, Interval};
    use crate::population::Population;
    use crate::rng::Pmmlcg;

    fn setup(
        cfg: &Config,
        specs: &[(f64, f64)], // (lo, hi) intervals, all action 0
    ) -> (Population, Vec<ClassifierId>) {
        let mut pop = Population::new();
        let mut rng = Pmmlcg::new(1).unwrap();
        for &(lo, hi) in specs {
            let cl = Classifier::from_covering(
                cfg,
                Condition::new(vec![Interval::new(lo, hi)]),
                0,
                0,
            );
            pop.add(cl, cfg, &mut rng);
        }
        let ids = pop.iter().map(|(id, _)| id).collect();
        (pop, ids)
    }

    #[test]
    fn constant_reward_drives_prediction_to_reward() {
        let cfg = Config::default();
        let (mut pop, ids) = setup(&cfg, &[(0.0, 1.0)]);
        let reward = 500.0;

        // O(1/beta) steps: a couple of dozen updates at beta = 0.2.
        for _ in 0..30 {
            reinforce(&mut pop, &ids, reward, &cfg);
        }

        let cl = pop.get(ids[0]).unwrap();
        assert!(
            (cl.prediction - reward).abs() < 1.0,
            "prediction {} did not converge to {}",
            cl.prediction,
            reward
        );
        assert!(cl.prediction_error < cfg.epsilon_0 * 20.0);
        assert_eq!(cl.experience, 30);
    }

    #[test]
    fn first_update_snaps_to_reward_via_mam() {
        let cfg = Config::default();
        let (mut pop, ids) = setup(&cfg, &[(0.0, 1.0)]);
        reinforce(&mut pop, &ids, 800.0, &cfg);
        // experience 1 < 1/beta: incremental average over one sample.
        let cl = pop.get(ids[0]).unwrap();
        assert_eq!(cl.prediction, 800.0);
        assert_eq!(cl.as_size, 1.0);
    }

    #[test]
    fn error_update_uses_pre_update_prediction() {
        let cfg = Config {
            beta: 1.0, // experience >= 1/beta immediately: pure Widrow-Hoff
            ..Config::default()
        };
        let (mut pop, ids) = setup(&cfg, &[(0.0, 1.0)]);
        {
            let cl = pop.get_mut(ids[0]).unwrap();
            cl.prediction = 100.0;
            cl.prediction_error = 0.0;
        }
        reinforce(&mut pop, &ids, 200.0, &cfg);

        let cl = pop.get(ids[0]).unwrap();
        // With beta = 1: eps <- |200 - 100| = 100 (pre-update p), p <- 200.
        // Had p been updated first, eps would have been 0.
        assert_eq!(cl.prediction_error, 100.0);
        assert_eq!(cl.prediction, 200.0);
    }

    #[test]
    fn as_size_tracks_set_numerosity() {
        let cfg = Config::default();
        let (mut pop, ids) = setup(&cfg, &[(0.0, 0.9), (0.05, 1.0), (0.1, 0.95)]);
        for _ in 0..40 {
            reinforce(&mut pop, &ids, 100.0, &cfg);
        }
        for &id in &ids {
            let cl = pop.get(id).unwrap();
            assert!(
                (cl.as_size - 3.0).abs() < 0.5,
                "as_size {} should approach 3",
                cl.as_size
            );
        }
    }

    #[test]
    fn fitness_shares_accuracy_within_the_niche() {
        let cfg = Config::default();
        let (mut pop, ids) = setup(&cfg, &[(0.0, 0.9), (0.05, 1.0)]);
        for _ in 0..50 {
            reinforce(&mut pop, &ids, 100.0, &cfg);
        }
        // Both accurate and identical in stats: shared fitness splits the
        // niche evenly and sums to ~1.
        let total: f64 = ids.iter().map(|&id| pop.get(id).unwrap().fitness).sum();
        assert!((total - 1.0).abs() < 0.05, "fitness sum {}", total);
        let f0 = pop.get(ids[0]).unwrap().fitness;
        let f1 = pop.get(ids[1]).unwrap().fitness;
        assert!((f0 - f1).abs() < 1e-9);
    }

    #[test]
    fn empty_action_set_is_a_no_op() {
        let cfg = Config::default();
        let (mut pop, _) = setup(&cfg, &[(0.0, 1.0)]);
        reinforce(&mut pop, &[], 100.0, &cfg);
        assert_eq!(pop.iter().next().unwrap().1.experience, 0);
    }
}
