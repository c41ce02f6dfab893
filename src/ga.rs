// src/ga.rs
//
// Niche genetic algorithm, restricted to one action set.
//
// Runs only in explore trials, and only when the numerosity-weighted mean
// time since the last GA in this action set exceeds theta_ga. Two parents
// are drawn fitness-proportionately, recombined by two-point crossover over
// the flattened allele sequence, mutated per allele and per action, and the
// offspring are either absorbed by a subsuming parent or inserted through
// the population's merge/deletion rules. Parent numerosity is never split.

use crate::classifier::Classifier;
use crate::condition::Condition;
use crate::config::Config;
use crate::population::{ClassifierId, Population};
use crate::rng::Pmmlcg;

/// Run the GA on one action set. Returns true when offspring were inserted.
pub fn run_ga(
    population: &mut Population,
    action_set: &[ClassifierId],
    time: u64,
    num_actions: usize,
    cfg: &Config,
    rng: &mut Pmmlcg,
) -> bool {
    if action_set.is_empty() {
        return false;
    }
    if time as f64 - mean_timestamp(population, action_set) <= cfg.theta_ga {
        return false;
    }

    for &id in action_set {
        if let Some(cl) = population.get_mut(id) {
            cl.timestamp = time;
        }
    }

    let fitness_sum: f64 = action_set
        .iter()
        .filter_map(|&id| population.get(id))
        .map(|cl| cl.fitness)
        .sum();

    let parent1_id = select_parent(population, action_set, fitness_sum, rng);
    let parent2_id = select_parent(population, action_set, fitness_sum, rng);
    let (parent1, parent2) = match (population.get(parent1_id), population.get(parent2_id)) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        _ => return false,
    };

    let mut child1 = Classifier::offspring_of(&parent1);
    let mut child2 = Classifier::offspring_of(&parent2);

    crossover(&mut child1, &mut child2, cfg, rng);
    mutate(&mut child1, num_actions, cfg, rng);
    mutate(&mut child2, num_actions, cfg, rng);

    // Both children share the discounted parental means.
    let prediction = (child1.prediction + child2.prediction) / 2.0;
    let error = cfg.error_reduction * ((child1.prediction_error + child2.prediction_error) / 2.0);
    let fitness = cfg.fitness_reduction * ((child1.fitness + child2.fitness) / 2.0);
    for child in [&mut child1, &mut child2] {
        child.prediction = prediction;
        child.prediction_error = error;
        child.fitness = fitness;
    }

    let mut offspring = Vec::with_capacity(2);
    let mut parent_absorbed = false;
    for child in [child1, child2] {
        match absorbing_parent(cfg, &child, &[(parent1_id, &parent1), (parent2_id, &parent2)]) {
            Some(parent_id) => {
                if let Some(parent) = population.get_mut(parent_id) {
                    parent.numerosity += 1;
                    parent_absorbed = true;
                }
            }
            None => offspring.push(child),
        }
    }

    let inserted = !offspring.is_empty();
    population.add_all(offspring, cfg, rng);
    if parent_absorbed {
        // Parent subsumption grows numerosity outside of add(); restore the
        // micro-classifier bound.
        population.enforce_capacity(cfg, rng);
    }
    inserted
}

/// Numerosity-weighted mean GA timestamp of the set.
fn mean_timestamp(population: &Population, action_set: &[ClassifierId]) -> f64 {
    let mut weighted = 0.0;
    let mut numerosity = 0.0;
    for &id in action_set {
        if let Some(cl) = population.get(id) {
            weighted += cl.timestamp as f64 * cl.numerosity as f64;
            numerosity += cl.numerosity as f64;
        }
    }
    if numerosity == 0.0 {
        0.0
    } else {
        weighted / numerosity
    }
}

/// Fitness-proportionate roulette over the action set.
fn select_parent(
    population: &Population,
    action_set: &[ClassifierId],
    fitness_sum: f64,
    rng: &mut Pmmlcg,
) -> ClassifierId {
    let choice_point = rng.next_f64() * fitness_sum;
    let mut accumulated = 0.0;
    for &id in action_set {
        if let Some(cl) = population.get(id) {
            accumulated += cl.fitness;
            if accumulated >= choice_point {
                return id;
            }
        }
    }
    // Floating-point shortfall: fall back to the last member.
    action_set[action_set.len() - 1]
}

/// Two-point crossover over the flattened allele sequences, applied with
/// probability `p_crossover`. Representation-specific by construction: the
/// flattened values are bounds for OBR/UBR and (center, spread) pairs for
/// CSR, so swapping sub-ranges swaps exactly those components.
fn crossover(child1: &mut Classifier, child2: &mut Classifier, cfg: &Config, rng: &mut Pmmlcg) {
    if rng.next_f64() >= cfg.p_crossover {
        return;
    }

    let mut flat1 = child1.condition.flatten();
    let mut flat2 = child2.condition.flatten();
    if flat1.len() != flat2.len() {
        return;
    }
    let length = flat1.len();

    let mut cut1 = rng.next_below(length);
    let mut cut2 = rng.next_below(length) + 1;
    if cut1 > cut2 {
        std::mem::swap(&mut cut1, &mut cut2);
    } else if cut1 == cut2 {
        cut2 += 1;
    }
    let cut2 = cut2.min(length);

    let mut changed = false;
    for i in cut1..cut2 {
        if flat1[i] != flat2[i] {
            changed = true;
            std::mem::swap(&mut flat1[i], &mut flat2[i]);
        }
    }

    if changed {
        child1.condition = Condition::from_flat(cfg.encoding, cfg, &flat1);
        child2.condition = Condition::from_flat(cfg.encoding, cfg, &flat2);
    }
}

/// Per-allele additive mutation plus action mutation, each with probability
/// `p_mutation`. The action mutates to a uniformly drawn different action.
fn mutate(child: &mut Classifier, num_actions: usize, cfg: &Config, rng: &mut Pmmlcg) {
    let mut flat = child.condition.flatten();
    let mut changed = false;
    for value in flat.iter_mut() {
        if rng.next_f64() < cfg.p_mutation {
            *value += cfg.encoding.mutation_delta(cfg, rng);
            changed = true;
        }
    }
    if changed {
        child.condition = Condition::from_flat(cfg.encoding, cfg, &flat);
    }

    if num_actions > 1 && rng.next_f64() < cfg.p_mutation {
        loop {
            let action = rng.next_below(num_actions);
            if action != child.action {
                child.action = action;
                break;
            }
        }
    }
}

/// The first parent eligible to absorb the child, if any.
fn absorbing_parent(
    cfg: &Config,
    child: &Classifier,
    parents: &[(ClassifierId, &Classifier)],
) -> Option<ClassifierId> {
    parents
        .iter()
        .find(|(_, parent)| parent.could_subsume(cfg, child))
        .map(|(id, _)| *id)
}
