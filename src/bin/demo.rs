//! Runs one Metropolis–Hastings chain for Bayesian linear regression and prints the
//! post-burn-in summary.
//!
//! # Usage
//!
//! ```bash
//! # Synthetic data (slope 3, intercept 20, sigma 5), default settings
//! cargo run --release --bin demo
//!
//! # Observations from a two-column table, reproducible run with a progress bar
//! cargo run --release --bin demo -- --data data/synthetic_data.csv --seed 42 --progress
//!
//! # Per-report log lines
//! RUST_LOG=demo=debug cargo run --bin demo -- --iterations 2000 --report-every 100
//! ```

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use linreg_mcmc::config::SamplerConfig;
use linreg_mcmc::core::{run_chain_with_progress, run_chain_with_report};
use linreg_mcmc::io::csv::load_observations;
use linreg_mcmc::io::synthetic::SyntheticData;
use linreg_mcmc::metropolis_hastings::MHMarkovChain;
use linreg_mcmc::model::Observations;
use linreg_mcmc::stats::summarize;

/// Bayesian linear regression with a Metropolis–Hastings sampler
#[derive(Parser, Debug)]
#[command(name = "demo")]
#[command(version)]
struct Args {
    /// Two-column (x, y) table; synthetic data is generated when omitted
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Chain length, including the initial state
    #[arg(short = 'n', long, default_value_t = 10_000)]
    iterations: usize,

    /// Leading samples dropped before summarizing
    #[arg(short, long, default_value_t = 1_000)]
    burn_in: usize,

    /// Proposal step size k
    #[arg(short = 'k', long, default_value_t = 0.1)]
    step_size: f64,

    /// Prior standard deviation of slope and intercept
    #[arg(long, default_value_t = 100.0)]
    prior_scale: f64,

    /// Seed for the chain
    #[arg(short, long)]
    seed: Option<u64>,

    /// Seed for synthetic data; defaults to one derived from --seed
    #[arg(long)]
    data_seed: Option<u64>,

    /// Log the current state every N iterations
    #[arg(long, default_value_t = 20)]
    report_every: usize,

    /// Show a progress bar instead of periodic log lines
    #[arg(short, long)]
    progress: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SamplerConfig::default()
        .iterations(args.iterations)
        .burn_in(args.burn_in)
        .step_size(args.step_size)
        .prior_scale(args.prior_scale)
        .report_every(args.report_every);
    if let Some(seed) = args.seed {
        config = config.set_seed(seed);
    }
    config.validate()?;

    let data: Observations = match &args.data {
        Some(path) => load_observations(path)?,
        None => {
            let synthetic = SyntheticData::default();
            let data_seed = args.data_seed.or_else(|| config.data_seed());
            info!(
                slope = synthetic.slope,
                intercept = synthetic.intercept,
                sigma = synthetic.sigma,
                n_points = synthetic.n_points,
                ?data_seed,
                "no data file given, generating synthetic observations"
            );
            let mut rng = match data_seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            synthetic.generate(&mut rng)?
        }
    };

    let mut mh = MHMarkovChain::from_config(&data, &config)?;

    let chain = if args.progress {
        let pb = ProgressBar::new(config.iterations as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("##-"),
        );
        let chain = run_chain_with_progress(&mut mh, config.iterations, &pb)?;
        pb.finish_with_message("Done!");
        chain
    } else {
        run_chain_with_report(&mut mh, config.iterations, config.report_every, |i, history| {
            if let Some(theta) = history.last() {
                debug!(iteration = i, %theta, "chain state");
            }
        })?
    };

    info!(
        acceptance_rate = mh.tracker().acceptance_rate(),
        final_state = %mh.current_state,
        "chain finished"
    );

    let summary = summarize(&chain, config.burn_in)?;
    println!("Summary of parameters");
    print!("{summary}");
    Ok(())
}
