// src/main.rs
//
// Research-harness CLI for the XCSR core.
//
// Constraints:
// - The seed is explicit: either --seed or --experiment (replication seed
//   table); there is no silent default.
// - Deterministic runs: identical arguments reproduce identical output.
// - Optional JSONL evaluation output via --out.
// - Concise run header on stderr; summary table on stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};

use xcsr::{
    Config, Encoding, Environment, Experiment, JsonlSink, NoopSink, Pmmlcg, SummaryStat,
    ThresholdEnv,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EncodingArg {
    OrderedBound,
    UnorderedBound,
    CenterSpread,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::OrderedBound => Encoding::OrderedBound,
            EncodingArg::UnorderedBound => Encoding::UnorderedBound,
            EncodingArg::CenterSpread => Encoding::CenterSpread,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "xcsr",
    about = "Real-valued extended classifier system (research harness)",
    version
)]
struct Args {
    /// Explicit seed for the learning stream (1 <= seed < 2^31-1).
    #[arg(long, conflicts_with = "experiment")]
    seed: Option<i64>,

    /// Replication number (1..=30); looks the seed up in the fixed table.
    #[arg(long)]
    experiment: Option<usize>,

    /// Seed for the demo environment's situation stream.
    /// Defaults to the learning seed + 1.
    #[arg(long)]
    env_seed: Option<i64>,

    /// Total number of trials.
    #[arg(long, default_value_t = 20_000)]
    trials: u64,

    /// Explore trials before switching to exploit.
    #[arg(long, default_value_t = 10_000)]
    explore_trials: u64,

    /// Micro-classifier population bound.
    #[arg(long, default_value_t = 6000)]
    pop_size: u32,

    /// Condition-allele encoding.
    #[arg(long, value_enum, default_value = "unordered-bound")]
    encoding: EncodingArg,

    /// Write evaluation windows and the summary as JSONL.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Verbosity: -v prints each evaluation window.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn print_stat(label: &str, stat: &SummaryStat) {
    println!(
        "{:<26}\t{:.4}\t{:.4}\t[{:.4}, {:.4}]",
        label, stat.mean, stat.std_dev, stat.ci_low, stat.ci_high
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let rng = match (args.seed, args.experiment) {
        (Some(seed), None) => Pmmlcg::new(seed).context("invalid --seed")?,
        (None, Some(experiment)) => {
            Pmmlcg::for_experiment(experiment).context("invalid --experiment")?
        }
        (None, None) => bail!("a seed is required: pass --seed or --experiment"),
        (Some(_), Some(_)) => unreachable!("clap rejects the combination"),
    };
    let seed = rng.initial_seed();
    let env_seed = args.env_seed.unwrap_or(seed + 1);
    let env_rng = Pmmlcg::new(env_seed).context("invalid --env-seed")?;

    let cfg = Config {
        max_pop_size: args.pop_size,
        encoding: args.encoding.into(),
        ..Config::default()
    };

    eprintln!(
        "xcsr | seed={} env_seed={} encoding={} pop={} trials={} explore={}",
        seed,
        env_seed,
        cfg.encoding.as_str(),
        cfg.max_pop_size,
        args.trials,
        args.explore_trials
    );

    let env = ThresholdEnv::new(env_rng);
    let max_payoff = env.max_payoff();

    let summary = match &args.out {
        Some(path) => {
            let sink = JsonlSink::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut experiment = Experiment::new(&cfg, env, rng, sink, args.explore_trials)?;
            run(&mut experiment, args.trials, args.verbose)
        }
        None => {
            let mut experiment = Experiment::new(&cfg, env, rng, NoopSink, args.explore_trials)?;
            run(&mut experiment, args.trials, args.verbose)
        }
    };

    println!("Metric\tMean\tStdDev\tConf.Interval");
    print_stat("Overall Fraction Correct:", &summary.fraction_correct);
    print_stat("Overall System Error:", &summary.system_error);
    print_stat("Overall Avg. Population:", &summary.avg_population_size);
    println!("Covering ops:\t{}", summary.covering_ops);
    println!("GA ops:\t{}", summary.ga_ops);
    println!("Max payoff:\t{}", max_payoff);

    Ok(())
}

fn run<E: Environment, S: xcsr::EvalSink>(
    experiment: &mut Experiment<E, S>,
    trials: u64,
    verbose: u8,
) -> xcsr::ExperimentSummary {
    if verbose == 0 || trials == 0 {
        return experiment.run(trials);
    }
    // Verbose mode prints per-trial traces without changing the run itself.
    for _ in 0..trials.saturating_sub(1) {
        let outcome = experiment.run_trial();
        if verbose > 1 {
            eprintln!(
                "trial={} explore={} action={} reward={} pop={}",
                outcome.trial, outcome.explore, outcome.action, outcome.reward,
                outcome.population_size
            );
        }
    }
    experiment.run(1)
}
