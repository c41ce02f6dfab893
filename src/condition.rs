// src/condition.rs
//
// Interval alleles and per-dimension matching predicates.
//
// A condition is one interval per input dimension. Three allele encodings
// are supported; the active one is chosen once per experiment in the config
// and owns every encoding-specific operation (contains test, covering
// interval synthesis, don't-care construction, mutation magnitude,
// subsumption). All contains tests are half-open: `lower <= x < upper`.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::rng::Pmmlcg;

/// Allele encoding for real-valued interval conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    /// `(lower, upper)`, stored ordered; direct contains test.
    OrderedBound,
    /// Endpoints may be stored in either order; the contains test sorts
    /// them at test time, not at storage time.
    UnorderedBound,
    /// `(center, spread)`; the contains test derives
    /// `[center - spread, center + spread)`.
    CenterSpread,
}

impl Encoding {
    /// Stable lowercase name (used in run headers and telemetry).
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::OrderedBound => "ordered-bound",
            Encoding::UnorderedBound => "unordered-bound",
            Encoding::CenterSpread => "center-spread",
        }
    }
}

/// One allele pair. Interpretation of the two values belongs to the active
/// `Encoding`: bounds for ordered/unordered-bound, (center, spread) for
/// center-spread.
///
/// Equality is structural over the stored pair. Under the unordered-bound
/// encoding, `(lo, hi)` and `(hi, lo)` accept exactly the same inputs but
/// remain distinct genotypes and are never merged by equality-based
/// numerosity dedup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub a: f64,
    pub b: f64,
}

impl Interval {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

impl Encoding {
    /// Resolved half-open bounds `[lower, upper)` of an interval.
    pub fn bounds(&self, iv: Interval) -> (f64, f64) {
        match self {
            Encoding::OrderedBound => (iv.a, iv.b),
            Encoding::UnorderedBound => {
                if iv.a <= iv.b {
                    (iv.a, iv.b)
                } else {
                    (iv.b, iv.a)
                }
            }
            Encoding::CenterSpread => (iv.a - iv.b, iv.a + iv.b),
        }
    }

    /// Half-open contains test under this encoding.
    pub fn contains(&self, iv: Interval, x: f64) -> bool {
        let (lower, upper) = self.bounds(iv);
        x >= lower && x < upper
    }

    /// Clip an interval back into the phenotype range.
    ///
    /// Out-of-range endpoints are clamped; a clipped center-spread allele is
    /// rebuilt from its clamped endpoints so that (center, spread) stay
    /// consistent with the stored pair.
    pub fn clip(&self, cfg: &Config, iv: Interval) -> Interval {
        let clamp = |x: f64| x.clamp(cfg.min_phenotype, cfg.max_phenotype);
        match self {
            Encoding::OrderedBound | Encoding::UnorderedBound => {
                Interval::new(clamp(iv.a), clamp(iv.b))
            }
            Encoding::CenterSpread => {
                let lower = clamp(iv.a - iv.b);
                let upper = clamp(iv.a + iv.b);
                if lower == iv.a - iv.b && upper == iv.a + iv.b {
                    iv
                } else {
                    Interval::new((lower + upper) / 2.0, (upper - lower) / 2.0)
                }
            }
        }
    }

    /// Maximally general interval spanning the full phenotype range.
    ///
    /// Under unordered bounds the stored orientation is randomized 50/50 so
    /// don't-care alleles do not bias the endpoint order distribution.
    pub fn dont_care(&self, cfg: &Config, rng: &mut Pmmlcg) -> Interval {
        match self {
            Encoding::OrderedBound => Interval::new(cfg.min_phenotype, cfg.max_phenotype),
            Encoding::UnorderedBound => {
                if rng.next_bool() {
                    Interval::new(cfg.min_phenotype, cfg.max_phenotype)
                } else {
                    Interval::new(cfg.max_phenotype, cfg.min_phenotype)
                }
            }
            Encoding::CenterSpread => Interval::new(
                (cfg.min_phenotype + cfg.max_phenotype) / 2.0,
                (cfg.max_phenotype - cfg.min_phenotype) / 2.0,
            ),
        }
    }

    /// Synthesize an interval guaranteed to contain `x` (covering).
    ///
    /// Bound encodings draw two independent spreads for the two endpoints
    /// and clip; unordered bounds additionally flip the stored orientation
    /// with probability 0.5. Center-spread stores `(x, draw)` directly.
    pub fn covering_interval(&self, cfg: &Config, x: f64, rng: &mut Pmmlcg) -> Interval {
        match self {
            Encoding::OrderedBound => {
                let lower = x - rng.next_f64() * cfg.covering_range;
                let upper = x + rng.next_f64() * cfg.covering_range;
                self.clip(cfg, Interval::new(lower, upper))
            }
            Encoding::UnorderedBound => {
                let lower = x - rng.next_f64() * cfg.covering_range;
                let upper = x + rng.next_f64() * cfg.covering_range;
                let iv = self.clip(cfg, Interval::new(lower, upper));
                if rng.next_bool() {
                    Interval::new(iv.b, iv.a)
                } else {
                    iv
                }
            }
            Encoding::CenterSpread => {
                self.clip(cfg, Interval::new(x, rng.next_f64() * cfg.covering_spread))
            }
        }
    }

    /// Signed mutation delta for one allele value. The sign is drawn first,
    /// then the magnitude, so the draw order is stable across encodings.
    pub fn mutation_delta(&self, cfg: &Config, rng: &mut Pmmlcg) -> f64 {
        let positive = rng.next_bool();
        let magnitude = match self {
            Encoding::OrderedBound | Encoding::UnorderedBound => {
                rng.next_f64() * cfg.mutation_bound
            }
            Encoding::CenterSpread => rng.next_f64() * cfg.mutation_spread,
        };
        if positive {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Whether `outer` covers at least the region of `inner`.
    pub fn subsumes(&self, outer: Interval, inner: Interval) -> bool {
        let (ol, ou) = self.bounds(outer);
        let (il, iu) = self.bounds(inner);
        ol <= il && ou >= iu
    }
}

/// Ordered sequence of intervals, one per input dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    genes: Vec<Interval>,
}

impl Condition {
    pub fn new(genes: Vec<Interval>) -> Self {
        Self { genes }
    }

    pub fn dimension(&self) -> usize {
        self.genes.len()
    }

    pub fn gene(&self, locus: usize) -> Interval {
        self.genes[locus]
    }

    /// Per-dimension half-open contains test, short-circuiting on the first
    /// failing dimension.
    ///
    /// # Panics
    ///
    /// A situation of a different dimensionality than the condition is a
    /// fatal precondition violation; it is rejected outright rather than
    /// truncated or padded.
    pub fn matches(&self, encoding: Encoding, situation: &[f64]) -> bool {
        assert_eq!(
            situation.len(),
            self.genes.len(),
            "situation dimension {} does not match condition dimension {}",
            situation.len(),
            self.genes.len()
        );
        self.genes
            .iter()
            .zip(situation)
            .all(|(iv, &x)| encoding.contains(*iv, x))
    }

    /// Whether this condition covers at least the region of `other` in every
    /// dimension without being the identical genotype.
    pub fn is_more_general(&self, encoding: Encoding, other: &Condition) -> bool {
        if self.genes.len() != other.genes.len() {
            return false;
        }
        self != other
            && self
                .genes
                .iter()
                .zip(&other.genes)
                .all(|(o, i)| encoding.subsumes(*o, *i))
    }

    /// Flatten to the allele sequence used by the GA operators
    /// (two values per dimension, locus order preserved).
    pub fn flatten(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.genes.len() * 2);
        for iv in &self.genes {
            flat.push(iv.a);
            flat.push(iv.b);
        }
        flat
    }

    /// Rebuild from a flattened allele sequence, re-clipping every pair into
    /// the phenotype range.
    pub fn from_flat(encoding: Encoding, cfg: &Config, flat: &[f64]) -> Self {
        debug_assert!(flat.len() % 2 == 0, "allele sequence must pair up");
        let genes = flat
            .chunks_exact(2)
            .map(|pair| encoding.clip(cfg, Interval::new(pair[0], pair[1])))
            .collect();
        Self { genes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn ordered_bound_contains_is_half_open() {
        let enc = Encoding::OrderedBound;
        let iv = Interval::new(0.2, 0.6);
        assert!(enc.contains(iv, 0.2));
        assert!(enc.contains(iv, 0.59));
        assert!(!enc.contains(iv, 0.6));
        assert!(!enc.contains(iv, 0.1));
    }

    #[test]
    fn unordered_bound_resolves_order_at_test_time() {
        let enc = Encoding::UnorderedBound;
        let fwd = Interval::new(0.2, 0.6);
        let rev = Interval::new(0.6, 0.2);
        for x in [0.0, 0.2, 0.4, 0.5999, 0.6, 0.9] {
            assert_eq!(enc.contains(fwd, x), enc.contains(rev, x));
        }
        // Logically equal, structurally distinct.
        assert_ne!(fwd, rev);
    }

    #[test]
    fn center_spread_derives_bounds() {
        let enc = Encoding::CenterSpread;
        let iv = Interval::new(0.5, 0.1);
        assert_eq!(enc.bounds(iv), (0.4, 0.6));
        assert!(enc.contains(iv, 0.4));
        assert!(!enc.contains(iv, 0.6));
    }

    #[test]
    fn clip_pulls_endpoints_into_range() {
        let cfg = cfg();
        let enc = Encoding::OrderedBound;
        let iv = enc.clip(&cfg, Interval::new(-0.3, 1.4));
        assert_eq!((iv.a, iv.b), (0.0, 1.0));

        let enc = Encoding::CenterSpread;
        let iv = enc.clip(&cfg, Interval::new(0.1, 0.5));
        // Derived [-0.4, 0.6) clamps to [0.0, 0.6) => center 0.3, spread 0.3.
        assert!((iv.a - 0.3).abs() < 1e-12);
        assert!((iv.b - 0.3).abs() < 1e-12);
    }

    #[test]
    fn dont_care_spans_full_range() {
        let cfg = cfg();
        let mut rng = Pmmlcg::new(99).unwrap();
        for enc in [
            Encoding::OrderedBound,
            Encoding::UnorderedBound,
            Encoding::CenterSpread,
        ] {
            let iv = enc.dont_care(&cfg, &mut rng);
            assert_eq!(enc.bounds(iv), (cfg.min_phenotype, cfg.max_phenotype));
        }
    }

    #[test]
    fn matches_short_circuits_per_dimension() {
        let enc = Encoding::OrderedBound;
        let cond = Condition::new(vec![Interval::new(0.0, 0.5), Interval::new(0.5, 1.0)]);
        assert!(cond.matches(enc, &[0.25, 0.75]));
        assert!(!cond.matches(enc, &[0.75, 0.75]));
        assert!(!cond.matches(enc, &[0.25, 0.25]));
    }

    #[test]
    #[should_panic(expected = "does not match condition dimension")]
    fn dimension_mismatch_is_fatal() {
        let cond = Condition::new(vec![Interval::new(0.0, 1.0)]);
        cond.matches(Encoding::OrderedBound, &[0.5, 0.5]);
    }

    #[test]
    fn more_general_requires_every_dimension() {
        let enc = Encoding::OrderedBound;
        let wide = Condition::new(vec![Interval::new(0.0, 1.0), Interval::new(0.0, 1.0)]);
        let narrow = Condition::new(vec![Interval::new(0.2, 0.4), Interval::new(0.3, 0.6)]);
        let mixed = Condition::new(vec![Interval::new(0.2, 0.4), Interval::new(-0.5, 2.0)]);
        assert!(wide.is_more_general(enc, &narrow));
        assert!(!narrow.is_more_general(enc, &wide));
        assert!(!wide.is_more_general(enc, &mixed));
        assert!(!wide.is_more_general(enc, &wide));
    }

    #[test]
    fn flatten_round_trips_in_range_alleles() {
        let cfg = cfg();
        let enc = Encoding::UnorderedBound;
        let cond = Condition::new(vec![Interval::new(0.6, 0.2), Interval::new(0.1, 0.9)]);
        let rebuilt = Condition::from_flat(enc, &cfg, &cond.flatten());
        assert_eq!(cond, rebuilt);
    }
}
