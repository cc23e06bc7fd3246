/*!
# Metropolis–Hastings Sampler

This module implements the Metropolis–Hastings transition for the linear regression
posterior, both as free functions and as a single Markov chain ([`MHMarkovChain`]) that
owns its random number generator.

## Overview

- **Target Distribution (`D`)**: provides the unnormalized log-density via the [`Target`] trait.
- **Proposal Distribution (`Q`)**: generates candidates and evaluates the proposal density via
  the [`Proposal`] trait.
- **Transition**: propose `theta'`, compute
  `log_accept_ratio = [log p(theta') - log p(theta)] + [log q(theta | theta') - log q(theta' | theta)]`,
  draw `u ~ Uniform(0, 1)` and move to `theta'` iff `ln(u) < log_accept_ratio`. A rejected
  step keeps the previous state verbatim.
- **Reproducibility**: a chain built with a seed always produces the same sequence.

## Example Usage

```rust
use linreg_mcmc::config::SamplerConfig;
use linreg_mcmc::core::run_chain;
use linreg_mcmc::metropolis_hastings::MHMarkovChain;
use linreg_mcmc::model::Observations;

let data = Observations::from_pairs(&[(0.0, 1.0), (1.0, 3.1), (2.0, 4.9), (3.0, 7.2)]).unwrap();
let config = SamplerConfig::default().iterations(500).burn_in(100).set_seed(42);

let mut mh = MHMarkovChain::from_config(&data, &config).unwrap();
let chain = run_chain(&mut mh, config.iterations).unwrap();
assert_eq!(chain.len(), 500);
```
*/

use rand::prelude::*;
use tracing::{debug, info, warn};

use crate::config::SamplerConfig;
use crate::core::MarkovChain;
use crate::distributions::{
    generate_initial_theta, log_proposal_ratio, GammaRandomWalk, LinearRegression, Proposal,
    Target,
};
use crate::error::Result;
use crate::model::{Observations, StepSize, Theta};
use crate::stats::{ChainTracker, ACCEPT_WINDOW};

/// Outcome of one accept/reject decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// The state the chain holds after the decision.
    pub state: Theta,
    pub accepted: bool,
    pub log_accept_ratio: f64,
}

/// `[log p(proposed) - log p(current)] + log q(current | proposed) - log q(proposed | current)`.
pub fn log_accept_ratio<D: Target, Q: Proposal>(
    target: &D,
    proposal: &Q,
    current: &Theta,
    proposed: &Theta,
) -> f64 {
    (target.unnorm_log_prob(proposed) - target.unnorm_log_prob(current))
        + log_proposal_ratio(proposal, current, proposed)
}

/// Accept/reject decision given an explicit uniform draw `u`.
///
/// A NaN ratio compares false and therefore rejects.
pub fn mh_transition<D: Target, Q: Proposal>(
    target: &D,
    proposal: &Q,
    current: &Theta,
    proposed: Theta,
    u: f64,
) -> Transition {
    let log_accept_ratio = log_accept_ratio(target, proposal, current, &proposed);
    let accepted = u.ln() < log_accept_ratio;
    Transition {
        state: if accepted { proposed } else { *current },
        accepted,
        log_accept_ratio,
    }
}

/// [`mh_transition`] for the linear model with the default prior and step size `k`.
pub fn transition(
    prev: &Theta,
    proposed: Theta,
    data: &Observations,
    k: StepSize,
    u: f64,
) -> Transition {
    mh_transition(
        &LinearRegression::new(data),
        &GammaRandomWalk::new(k),
        prev,
        proposed,
        u,
    )
}

/// Advances a chain by one Metropolis–Hastings step from `prev`.
///
/// Returns either the accepted proposal or `prev` unchanged. Random-source failures are
/// returned as errors; there is no retry.
pub fn step<R: Rng + ?Sized>(
    prev: &Theta,
    data: &Observations,
    k: StepSize,
    rng: &mut R,
) -> Result<Theta> {
    let target = LinearRegression::new(data);
    let proposal = GammaRandomWalk::new(k);
    let proposed = proposal.sample(prev, rng)?;
    let u: f64 = rng.gen();
    Ok(mh_transition(&target, &proposal, prev, proposed, u).state)
}

/// A single Markov chain for the Metropolis–Hastings algorithm.
///
/// The chain holds its target, its proposal, the current state and a chain-specific
/// random number generator. Acceptance statistics are tracked as it runs.
#[derive(Debug, Clone)]
pub struct MHMarkovChain<D, Q> {
    /// The target distribution to sample from.
    pub target: D,
    /// The proposal distribution used to generate candidate states.
    pub proposal: Q,
    /// The current state of the chain.
    pub current_state: Theta,
    /// The chain-specific random seed.
    pub seed: u64,
    /// The random number generator for this chain.
    pub rng: SmallRng,
    tracker: ChainTracker,
    last_transition: Option<Transition>,
}

impl<D: Target, Q: Proposal> MHMarkovChain<D, Q> {
    /**
    Creates a new Metropolis–Hastings chain starting at `initial_state`, with an RNG seeded
    from entropy. Use [`MHMarkovChain::set_seed`] for reproducible runs.

    # Examples

    ```rust
    use linreg_mcmc::distributions::{GammaRandomWalk, LinearRegression};
    use linreg_mcmc::metropolis_hastings::MHMarkovChain;
    use linreg_mcmc::model::{Observations, StepSize, Theta};

    let data = Observations::from_pairs(&[(1.0, 2.0), (2.0, 4.0)]).unwrap();
    let start = Theta::new(0.0, 0.0, 1.0).unwrap();
    let chain = MHMarkovChain::new(
        LinearRegression::new(&data),
        GammaRandomWalk::new(StepSize::new(0.1).unwrap()),
        start,
    );
    assert_eq!(chain.current_state, start);
    ```
    */
    pub fn new(target: D, proposal: Q, initial_state: Theta) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            target,
            proposal,
            current_state: initial_state,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            tracker: ChainTracker::new(),
            last_transition: None,
        }
    }

    /// Reseeds the chain's random number generator.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Running statistics over every transition made so far.
    pub fn tracker(&self) -> &ChainTracker {
        &self.tracker
    }

    /// The most recent accept/reject decision, if any step has been taken.
    pub fn last_transition(&self) -> Option<&Transition> {
        self.last_transition.as_ref()
    }

    fn check_acceptance(&self) {
        let n = self.tracker.n();
        if n == 0 || n % ACCEPT_WINDOW as u64 != 0 {
            return;
        }
        let rate = self.tracker.window_acceptance_rate();
        if rate < 0.01 {
            warn!(
                iteration = n,
                rate, "acceptance rate below 1% over the last {ACCEPT_WINDOW} steps; consider a smaller step size"
            );
        } else if rate > 0.9 {
            warn!(
                iteration = n,
                rate, "acceptance rate above 90% over the last {ACCEPT_WINDOW} steps; consider a larger step size"
            );
        }
    }
}

impl<'a> MHMarkovChain<LinearRegression<'a>, GammaRandomWalk> {
    /// Builds a chain over `data` from a validated [`SamplerConfig`], drawing the initial
    /// state with [`generate_initial_theta`] from the chain's own seeded RNG.
    pub fn from_config(data: &'a Observations, config: &SamplerConfig) -> Result<Self> {
        let (step_size, prior) = config.validate()?;
        let seed = config.seed.unwrap_or_else(|| thread_rng().gen::<u64>());
        let mut rng = SmallRng::seed_from_u64(seed);
        let initial_state = generate_initial_theta(&mut rng)?;
        info!(
            seed,
            step_size = step_size.get(),
            prior_scale = prior.scale(),
            n_observations = data.len(),
            %initial_state,
            "starting chain"
        );
        Ok(Self {
            target: LinearRegression::new(data).with_prior(prior),
            proposal: GammaRandomWalk::new(step_size),
            current_state: initial_state,
            seed,
            rng,
            tracker: ChainTracker::new(),
            last_transition: None,
        })
    }
}

impl<D: Target, Q: Proposal> MarkovChain for MHMarkovChain<D, Q> {
    /**
    Performs one Metropolis–Hastings update step.

    A candidate is drawn from the proposal; the acceptance ratio in log-space combines
    the target log-densities of both states with the Hastings correction. If
    `ln(Uniform(0, 1))` falls below it, the candidate becomes the current state;
    otherwise the current state is kept.
    */
    fn step(&mut self) -> Result<&Theta> {
        let proposed = self.proposal.sample(&self.current_state, &mut self.rng)?;
        let u: f64 = self.rng.gen();
        let t = mh_transition(
            &self.target,
            &self.proposal,
            &self.current_state,
            proposed,
            u,
        );
        debug!(
            iteration = self.tracker.n() + 1,
            log_accept_ratio = t.log_accept_ratio,
            accepted = t.accepted,
            "transition"
        );
        self.current_state = t.state;
        self.tracker.step(&t.state, t.accepted);
        self.last_transition = Some(t);
        self.check_acceptance();
        Ok(&self.current_state)
    }

    fn current_state(&self) -> &Theta {
        &self.current_state
    }
}
