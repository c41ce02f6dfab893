// src/covering.rs
//
// Covering: the discovery operator that manufactures a classifier for an
// action missing from the match set.
//
// The synthesized condition is guaranteed to match the covered situation
// (the postcondition is asserted in debug builds). Covering itself has no
// population side effects; inserting the result is the caller's business.

use crate::classifier::Classifier;
use crate::condition::Condition;
use crate::config::Config;
use crate::rng::Pmmlcg;

/// Build a classifier matching `situation` for the given action.
///
/// Each dimension becomes a don't-care interval with probability
/// `p_dont_care`, otherwise an interval spread around the situation value
/// (clipped to the phenotype range). Statistics start from the configured
/// initial constants.
pub fn create(
    cfg: &Config,
    situation: &[f64],
    action: usize,
    timestamp: u64,
    rng: &mut Pmmlcg,
) -> Classifier {
    let genes = situation
        .iter()
        .map(|&x| {
            if rng.next_f64() < cfg.p_dont_care {
                cfg.encoding.dont_care(cfg, rng)
            } else {
                cfg.encoding.covering_interval(cfg, x, rng)
            }
        })
        .collect();
    let classifier = Classifier::from_covering(cfg, Condition::new(genes), action, timestamp);
    debug_assert!(
        classifier.matches(cfg.encoding, situation),
        "covering produced a non-matching condition for {:?}",
        situation
    );
    classifier
}

/// Covering variant with a uniformly random action, for pure-exploration
/// harnesses that do not target a specific coverage gap.
pub fn create_random_action(
    cfg: &Config,
    situation: &[f64],
    num_actions: usize,
    timestamp: u64,
    rng: &mut Pmmlcg,
) -> Classifier {
    let action = rng.next_below(num_actions);
    create(cfg, situation, action, timestamp, rng)
}
