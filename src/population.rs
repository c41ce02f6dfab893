// src/population.rs
//
// Bounded population of macro-classifiers.
//
// Storage is an arena: a slot vector plus a free list. Slot indices are
// stable while a classifier is alive, so match and action sets can hold
// plain ids across in-place statistic updates. Scans that remove members
// (subsumption) collect a pending-removal set and apply it after the scan;
// nothing iterates and mutates the membership at the same time.
//
// Invariants:
//   - Σ numerosity <= max_pop_size after every public operation,
//   - no two live classifiers share an identical genotype (condition
//     alleles + action); `add` merges duplicates by numerosity.

use crate::classifier::Classifier;
use crate::config::Config;
use crate::rng::Pmmlcg;

/// Stable handle to a live classifier in a `Population`.
pub type ClassifierId = usize;

#[derive(Debug, Clone, Default)]
pub struct Population {
    slots: Vec<Option<Classifier>>,
    free: Vec<usize>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ClassifierId) -> Option<&Classifier> {
        self.slots.get(id).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: ClassifierId) -> Option<&mut Classifier> {
        self.slots.get_mut(id).and_then(|slot| slot.as_mut())
    }

    /// Live classifiers in stable slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassifierId, &Classifier)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|cl| (id, cl)))
    }

    /// Number of distinct genotypes (macro-classifiers).
    pub fn macro_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Number of micro-classifiers (Σ numerosity).
    pub fn numerosity_sum(&self) -> u64 {
        self.iter().map(|(_, cl)| cl.numerosity as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.macro_count() == 0
    }

    /// Mean fitness per micro-classifier; NaN fitness values are excluded
    /// from the numerator but their numerosity still counts.
    pub fn mean_fitness(&self) -> f64 {
        let total = self.numerosity_sum();
        if total == 0 {
            return 0.0;
        }
        let fitness_sum: f64 = self
            .iter()
            .map(|(_, cl)| cl.fitness)
            .filter(|f| !f.is_nan())
            .sum();
        fitness_sum / total as f64
    }

    fn insert(&mut self, classifier: Classifier) -> ClassifierId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(classifier);
                id
            }
            None => {
                self.slots.push(Some(classifier));
                self.slots.len() - 1
            }
        }
    }

    fn remove(&mut self, id: ClassifierId) {
        if self.slots[id].take().is_some() {
            self.free.push(id);
        }
    }

    fn find_genotype(&self, classifier: &Classifier) -> Option<ClassifierId> {
        self.iter()
            .find(|(_, cl)| cl.same_genotype(classifier))
            .map(|(id, _)| id)
    }

    /// Insert one fresh classifier (numerosity 1).
    ///
    /// Frees capacity by roulette deletion first, then either merges into an
    /// identical genotype (numerosity increment, the new object is dropped)
    /// or stores a new macro-classifier.
    pub fn add(&mut self, classifier: Classifier, cfg: &Config, rng: &mut Pmmlcg) {
        debug_assert_eq!(classifier.numerosity, 1, "fresh classifiers carry numerosity 1");
        while self.numerosity_sum() + 1 > cfg.max_pop_size as u64 {
            if !self.delete_one(cfg, rng) {
                break;
            }
        }
        match self.find_genotype(&classifier) {
            Some(id) => {
                if let Some(existing) = self.get_mut(id) {
                    existing.numerosity += 1;
                }
            }
            None => {
                self.insert(classifier);
            }
        }
    }

    /// Insert a batch (GA offspring) one by one.
    pub fn add_all(
        &mut self,
        classifiers: impl IntoIterator<Item = Classifier>,
        cfg: &Config,
        rng: &mut Pmmlcg,
    ) {
        for cl in classifiers {
            self.add(cl, cfg, rng);
        }
    }

    /// Restore the micro-classifier bound after out-of-band numerosity
    /// growth (parent subsumption in the GA).
    pub fn enforce_capacity(&mut self, cfg: &Config, rng: &mut Pmmlcg) {
        while self.numerosity_sum() > cfg.max_pop_size as u64 {
            if !self.delete_one(cfg, rng) {
                break;
            }
        }
    }

    /// Remove exactly one micro-classifier by roulette over deletion votes.
    ///
    /// Returns false when the call is degenerate (empty population, no
    /// finite fitness anywhere, or a non-finite vote sum) and is skipped.
    pub fn delete_one(&mut self, cfg: &Config, rng: &mut Pmmlcg) -> bool {
        if self.is_empty() {
            return false;
        }
        if !self.iter().any(|(_, cl)| cl.fitness.is_finite()) {
            return false;
        }

        let mean_fitness = self.mean_fitness();
        let vote_sum: f64 = self
            .iter()
            .map(|(_, cl)| cl.deletion_vote(cfg, mean_fitness))
            .sum();
        if !vote_sum.is_finite() || vote_sum <= 0.0 {
            return false;
        }

        let choice_point = vote_sum * rng.next_f64();
        let mut accumulated = 0.0;
        let mut victim = None;
        for (id, cl) in self.iter() {
            accumulated += cl.deletion_vote(cfg, mean_fitness);
            if accumulated > choice_point {
                victim = Some(id);
                break;
            }
        }
        // Floating-point shortfall on the last vote: fall back to the last
        // live classifier so exactly one unit is removed.
        let victim = match victim.or_else(|| self.iter().last().map(|(id, _)| id)) {
            Some(id) => id,
            None => return false,
        };

        if let Some(cl) = self.get_mut(victim) {
            if cl.numerosity > 1 {
                cl.numerosity -= 1;
            } else {
                self.remove(victim);
            }
        }
        true
    }

    /// Pairwise subsumption over a set of members.
    ///
    /// For every pair (A, B) where A is subsumption-eligible, shares B's
    /// action and is strictly more general, B's numerosity is merged into A
    /// and B is queued for removal. Self-subsumption and double-removal are
    /// excluded by the pending set; removals are applied after the scan.
    pub fn subsume_classifiers(&mut self, members: &[ClassifierId], cfg: &Config) {
        let mut pending_removal = vec![false; members.len()];

        for i in 0..members.len() {
            for j in 0..members.len() {
                if i == j || pending_removal[i] || pending_removal[j] {
                    continue;
                }
                let (a, b) = (members[i], members[j]);
                let absorbed = match (self.get(a), self.get(b)) {
                    (Some(subsumer), Some(subsumee)) if subsumer.could_subsume(cfg, subsumee) => {
                        Some(subsumee.numerosity)
                    }
                    _ => None,
                };
                if let Some(numerosity) = absorbed {
                    if let Some(subsumer) = self.get_mut(a) {
                        subsumer.numerosity += numerosity;
                    }
                    pending_removal[j] = true;
                }
            }
        }

        for (idx, remove) in pending_removal.iter().enumerate() {
            if *remove {
                self.remove(members[idx]);
            }
        }
    }
}
