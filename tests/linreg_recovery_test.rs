//! Tests verifying that the Metropolis–Hastings chain recovers the parameters of
//! synthetic linear regression data.
//!
//! We compare posterior means after burn-in with the parameters the data was generated
//! from, and check that every driver loop yields the same seeded chain.

use indicatif::ProgressBar;
use linreg_mcmc::config::SamplerConfig;
use linreg_mcmc::core::{run_chain, run_chain_with_progress, run_chain_with_report};
use linreg_mcmc::io::synthetic::SyntheticData;
use linreg_mcmc::metropolis_hastings::MHMarkovChain;
use linreg_mcmc::model::Observations;
use linreg_mcmc::stats::summarize;
use rand::rngs::SmallRng;
use rand::SeedableRng;

const SLOPE: f64 = 2.0;
const INTERCEPT: f64 = -1.0;
const SIGMA: f64 = 1.0;

fn observations() -> Observations {
    SyntheticData {
        slope: SLOPE,
        intercept: INTERCEPT,
        sigma: SIGMA,
        start: -2.0,
        spacing: 0.08,
        n_points: 50,
    }
    .generate(&mut SmallRng::seed_from_u64(42))
    .expect("Expecting synthetic data generation to succeed")
}

#[test]
fn test_posterior_mean_recovers_parameters() {
    const ITERATIONS: usize = 20_000;
    const BURNIN: usize = 5_000;
    const SEED: u64 = 42;

    let data = observations();
    let config = SamplerConfig::default()
        .iterations(ITERATIONS)
        .burn_in(BURNIN)
        .step_size(0.1)
        .set_seed(SEED);

    let mut mh = MHMarkovChain::from_config(&data, &config).unwrap();
    let chain = run_chain(&mut mh, config.iterations).unwrap();
    assert_eq!(chain.len(), ITERATIONS);

    let summary = summarize(&chain, BURNIN).unwrap();
    let expected = [SLOPE, INTERCEPT, SIGMA];
    for (param, truth) in summary.params.iter().zip(expected) {
        assert!(
            (param.mean - truth).abs() < 0.5,
            "Posterior mean of {} is {}, expected about {}",
            param.name,
            param.mean,
            truth
        );
        assert!(param.std > 0.0, "{} never moved after burn-in", param.name);
    }
    assert!(summary.params[2].min > 0.0);
    assert!(
        summary.acceptance_rate > 0.01 && summary.acceptance_rate < 0.95,
        "Unexpected acceptance rate {}",
        summary.acceptance_rate
    );
}

#[test]
fn test_driver_loops_produce_identical_chains() {
    const ITERATIONS: usize = 2_000;

    let data = observations();
    let config = SamplerConfig::default()
        .iterations(ITERATIONS)
        .burn_in(500)
        .set_seed(7);

    let plain = run_chain(
        &mut MHMarkovChain::from_config(&data, &config).unwrap(),
        ITERATIONS,
    )
    .unwrap();

    let mut reports = 0;
    let reported = run_chain_with_report(
        &mut MHMarkovChain::from_config(&data, &config).unwrap(),
        ITERATIONS,
        config.report_every,
        |i, history| {
            assert_eq!(history.len(), i + 1);
            reports += 1;
        },
    )
    .unwrap();

    let pb = ProgressBar::hidden();
    let with_progress = run_chain_with_progress(
        &mut MHMarkovChain::from_config(&data, &config).unwrap(),
        ITERATIONS,
        &pb,
    )
    .unwrap();

    assert_eq!(plain, reported);
    assert_eq!(plain, with_progress);
    // Every 20th iteration plus the final one.
    assert_eq!(reports, ITERATIONS / config.report_every + 1);
    assert!(plain.iter().all(|theta| theta.sigma() > 0.0));
}

#[test]
fn test_synthetic_data_and_chain_draw_from_separate_streams() {
    let config = SamplerConfig::default().set_seed(42);
    let settings = SyntheticData::default();
    let data_seed = config.data_seed().unwrap();
    assert_ne!(Some(data_seed), config.seed);

    let data = settings
        .generate(&mut SmallRng::seed_from_u64(data_seed))
        .unwrap();
    let mh = MHMarkovChain::from_config(&data, &config).unwrap();

    // A shared stream would make the initial slope equal to the first standardized noise draw.
    let (x0, y0) = data.iter().next().unwrap();
    let first_noise = (y0 - (settings.slope * x0 + settings.intercept)) / settings.sigma;
    assert!((mh.current_state.a() - first_noise).abs() > 1e-6);
}
