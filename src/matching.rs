// src/matching.rs
//
// Match-set construction over the population.
//
// A match set is a non-owning view: stable classifier ids plus the
// per-action coverage derived while scanning. It is valid only for the
// current trial; any insertion or deletion sweep invalidates it and the
// caller rebuilds.

use crate::config::Config;
use crate::population::{ClassifierId, Population};

/// Classifiers whose condition covers the current situation, with the
/// per-action coverage needed by the covering operator.
#[derive(Debug, Clone)]
pub struct MatchSet {
    members: Vec<ClassifierId>,
    covered: Vec<bool>,
}

impl MatchSet {
    /// Scan the whole population for matching conditions.
    pub fn build(
        population: &Population,
        cfg: &Config,
        situation: &[f64],
        num_actions: usize,
    ) -> Self {
        let mut members = Vec::new();
        let mut covered = vec![false; num_actions];
        for (id, cl) in population.iter() {
            if cl.matches(cfg.encoding, situation) {
                covered[cl.action] = true;
                members.push(id);
            }
        }
        Self { members, covered }
    }

    pub fn members(&self) -> &[ClassifierId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Actions with zero representation in this match set, in ascending
    /// order. Non-empty output feeds the covering operator.
    pub fn missing_actions(&self) -> impl Iterator<Item = usize> + '_ {
        self.covered
            .iter()
            .enumerate()
            .filter(|(_, covered)| !**covered)
            .map(|(action, _)| action)
    }

    pub fn has_missing_actions(&self) -> bool {
        self.covered.iter().any(|covered| !covered)
    }

    /// The members proposing one action (the action set for that action).
    pub fn action_set(&self, population: &Population, action: usize) -> Vec<ClassifierId> {
        self.members
            .iter()
            .copied()
            .filter(|&id| {
                population
                    .get(id)
                    .map(|cl| cl.action == action)
                    .unwrap_or(false)
            })
            .collect()
    }
}
