//! Covering postcondition and encoding symmetry.
//!
//! - Covering always produces a classifier that matches the covered
//!   situation, under every encoding and near the range boundaries.
//! - Unordered-bound conditions built from (lo, hi) and (hi, lo) accept
//!   exactly the same inputs.
//! - The experiment's covering loop leaves no action unrepresented.

use xcsr::{
    covering, Condition, Config, Encoding, Interval, MatchSet, Pmmlcg, Population,
};

#[test]
fn covering_postcondition_holds_for_all_encodings() {
    for encoding in [
        Encoding::OrderedBound,
        Encoding::UnorderedBound,
        Encoding::CenterSpread,
    ] {
        for p_dont_care in [0.0, 0.33, 1.0] {
            let cfg = Config {
                encoding,
                p_dont_care,
                ..Config::default()
            };
            let mut rng = Pmmlcg::new(600_564_467).unwrap();
            let mut situation_rng = Pmmlcg::new(546_526_942).unwrap();
            for trial in 0..300 {
                let situation = vec![
                    situation_rng.next_f64(),
                    situation_rng.next_f64(),
                    situation_rng.next_f64(),
                    situation_rng.next_f64(),
                ];
                let action = trial % 3;
                let cl = covering::create(&cfg, &situation, action, trial as u64, &mut rng);
                assert!(
                    cl.matches(cfg.encoding, &situation),
                    "covering violated its postcondition under {:?} (p#={}, trial {})",
                    encoding,
                    p_dont_care,
                    trial
                );
                assert_eq!(cl.action, action);
            }
        }
    }
}

#[test]
fn unordered_bound_symmetry_over_the_whole_range() {
    let enc = Encoding::UnorderedBound;
    let forward = Condition::new(vec![Interval::new(0.15, 0.75), Interval::new(0.6, 0.2)]);
    let reversed = Condition::new(vec![Interval::new(0.75, 0.15), Interval::new(0.2, 0.6)]);

    let mut probe = Pmmlcg::new(238_965_585).unwrap();
    for _ in 0..2_000 {
        let situation = [probe.next_f64(), probe.next_f64()];
        assert_eq!(
            forward.matches(enc, &situation),
            reversed.matches(enc, &situation),
            "endpoint order changed acceptance for {:?}",
            situation
        );
    }

    // Including the exact endpoints (half-open on the resolved bounds).
    for x in [0.15, 0.75, 0.2, 0.6] {
        let situation = [x, 0.4];
        assert_eq!(forward.matches(enc, &situation), reversed.matches(enc, &situation));
    }
}

#[test]
fn match_set_reports_uncovered_actions_until_covering_fills_them() {
    let cfg = Config {
        max_pop_size: 60,
        ..Config::default()
    };
    let mut rng = Pmmlcg::new(44).unwrap();
    let mut pop = Population::new();
    let situation = [0.42, 0.77];
    let num_actions = 4;

    let ms = MatchSet::build(&pop, &cfg, &situation, num_actions);
    assert_eq!(ms.missing_actions().count(), num_actions);

    // Cover exactly the missing actions, as the experiment loop does.
    for action in ms.missing_actions().collect::<Vec<_>>() {
        let cl = covering::create(&cfg, &situation, action, 0, &mut rng);
        pop.add(cl, &cfg, &mut rng);
    }

    let ms = MatchSet::build(&pop, &cfg, &situation, num_actions);
    assert!(!ms.has_missing_actions());
    assert_eq!(ms.len(), num_actions);
}

#[test]
fn covering_spread_never_exceeds_the_configured_range() {
    let cfg = Config {
        encoding: Encoding::OrderedBound,
        ..Config::default()
    };
    let mut rng = Pmmlcg::new(5_150).unwrap();
    for _ in 0..500 {
        let x = rng.next_f64();
        let cl = covering::create(&cfg, &[x], 0, 0, &mut rng);
        let (lower, upper) = cfg.encoding.bounds(cl.condition.gene(0));
        assert!(lower >= x - cfg.covering_range - 1e-12);
        assert!(upper <= x + cfg.covering_range + 1e-12);
        assert!(lower >= cfg.min_phenotype && upper <= cfg.max_phenotype);
    }
}
