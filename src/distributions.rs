/*!
Target and proposal distributions for Bayesian linear regression, together with the
traits the Metropolis–Hastings chain is written against.

- [`LinearRegression`] is the target: the unnormalized log-posterior of `(a, b, sigma)`
  given a borrowed [`Observations`] table and a [`Prior`].
- [`GammaRandomWalk`] is the proposal: a normal random walk on `(a, b)` with standard
  deviation `k`, and a gamma draw for `sigma` whose mean is the current `sigma`.

All scores are returned in log space. The free functions ([`log_likelihood`],
[`log_prior`], [`log_posterior`], [`propose_theta`], [`proposal_ratio`],
[`generate_initial_theta`]) are thin wrappers over the two structs using the default
prior and [`OMEGA`].

# Examples

```rust
use linreg_mcmc::distributions::{log_likelihood, log_posterior, log_prior};
use linreg_mcmc::model::{Observations, Theta};

let data = Observations::from_pairs(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]).unwrap();
let theta = Theta::new(1.0, 0.0, 1.0).unwrap();

let lp = log_posterior(&data, &theta);
assert_eq!(lp, log_likelihood(&data, &theta) + log_prior(&theta));
```
*/

use rand::Rng;
use rand_distr::{Distribution, Gamma, Normal, StandardNormal};
use statrs::consts::LN_SQRT_2PI;
use statrs::function::gamma::ln_gamma;

use crate::error::{Error, Result};
use crate::model::{Observations, StepSize, Theta};

/// Concentration of the gamma proposal for `sigma` relative to the step size.
/// Larger values give tighter `sigma` proposals for the same `k`.
pub const OMEGA: f64 = 500.0;

/// Default prior standard deviation for slope and intercept.
pub const DEFAULT_PRIOR_SCALE: f64 = 100.0;

/// A trait for continuous target distributions from which we want to sample.
pub trait Target {
    /// Returns the log of the unnormalized density for state `theta`.
    fn unnorm_log_prob(&self, theta: &Theta) -> f64;
}

/// A trait for generating proposals in Metropolis–Hastings.
pub trait Proposal {
    /// Samples a new point from q(x' | x).
    fn sample<R: Rng + ?Sized>(&self, current: &Theta, rng: &mut R) -> Result<Theta>;

    /// Evaluates log q(to | from).
    fn log_prob(&self, from: &Theta, to: &Theta) -> f64;
}

/// Log-density of `Normal(mean, std)` at `x`. `std` must be `> 0`.
pub fn normal_ln_pdf(x: f64, mean: f64, std: f64) -> f64 {
    let z = (x - mean) / std;
    -LN_SQRT_2PI - std.ln() - 0.5 * z * z
}

/// Log-density of `Gamma(shape, rate)` at `x`. `shape`, `rate` and `x` must be `> 0`.
pub fn gamma_ln_pdf(x: f64, shape: f64, rate: f64) -> f64 {
    shape * rate.ln() + (shape - 1.0) * x.ln() - rate * x - ln_gamma(shape)
}

/// Independent priors on the parameters: `a, b ~ N(0, scale)` and `sigma ~ Gamma(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prior {
    scale: f64,
}

impl Prior {
    /// Prior with a custom standard deviation for slope and intercept.
    pub fn new(scale: f64) -> Result<Self> {
        if scale.is_finite() && scale > 0.0 {
            Ok(Self { scale })
        } else {
            Err(Error::InvalidConfig(format!(
                "prior scale must be finite and > 0, got {scale}"
            )))
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sum of the three independent prior log-densities.
    pub fn log_prob(&self, theta: &Theta) -> f64 {
        normal_ln_pdf(theta.a(), 0.0, self.scale)
            + normal_ln_pdf(theta.b(), 0.0, self.scale)
            + gamma_ln_pdf(theta.sigma(), 1.0, 1.0)
    }
}

impl Default for Prior {
    fn default() -> Self {
        Self {
            scale: DEFAULT_PRIOR_SCALE,
        }
    }
}

/**
Unnormalized posterior of the linear model `y ~ N(a * x + b, sigma)`.

The observations are borrowed: the driver owns the data and the target only reads it.

# Examples

```rust
use linreg_mcmc::distributions::{LinearRegression, Prior, Target};
use linreg_mcmc::model::{Observations, Theta};

let data = Observations::from_pairs(&[(0.0, 1.0), (1.0, 3.0)]).unwrap();
let target = LinearRegression::new(&data).with_prior(Prior::new(10.0).unwrap());
let theta = Theta::new(2.0, 1.0, 0.5).unwrap();
assert!(target.unnorm_log_prob(&theta).is_finite());
```
*/
#[derive(Debug, Clone, Copy)]
pub struct LinearRegression<'a> {
    observations: &'a Observations,
    prior: Prior,
}

impl<'a> LinearRegression<'a> {
    pub fn new(observations: &'a Observations) -> Self {
        Self {
            observations,
            prior: Prior::default(),
        }
    }

    pub fn with_prior(mut self, prior: Prior) -> Self {
        self.prior = prior;
        self
    }

    pub fn observations(&self) -> &'a Observations {
        self.observations
    }

    pub fn prior(&self) -> Prior {
        self.prior
    }

    /// Sum over all observations of `log N(y | a * x + b, sigma)`.
    pub fn log_likelihood(&self, theta: &Theta) -> f64 {
        self.observations
            .iter()
            .map(|(x, y)| normal_ln_pdf(y, theta.predict(x), theta.sigma()))
            .sum()
    }

    pub fn log_prior(&self, theta: &Theta) -> f64 {
        self.prior.log_prob(theta)
    }

    /// `log_likelihood + log_prior`; equal to the log-posterior up to the log-evidence.
    pub fn log_posterior(&self, theta: &Theta) -> f64 {
        self.log_likelihood(theta) + self.log_prior(theta)
    }
}

impl Target for LinearRegression<'_> {
    fn unnorm_log_prob(&self, theta: &Theta) -> f64 {
        self.log_posterior(theta)
    }
}

/**
Random-walk proposal that keeps `sigma` positive.

`(a', b')` is drawn from `N((a, b), k^2 I)` and `sigma'` from a gamma distribution with
shape `sigma * k * OMEGA` and rate `k * OMEGA`, so that `E[sigma'] = sigma`. The gamma
kernel is not symmetric, which is why [`proposal_ratio`] has to be part of the acceptance
test.

# Examples

```rust
use linreg_mcmc::distributions::{GammaRandomWalk, Proposal};
use linreg_mcmc::model::{StepSize, Theta};
use rand::SeedableRng;
use rand::rngs::SmallRng;

let proposal = GammaRandomWalk::new(StepSize::new(0.1).unwrap());
let mut rng = SmallRng::seed_from_u64(42);
let current = Theta::new(0.0, 0.0, 1.0).unwrap();
let candidate = proposal.sample(&current, &mut rng).unwrap();
assert!(candidate.sigma() > 0.0);
```
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaRandomWalk {
    step_size: StepSize,
}

impl GammaRandomWalk {
    pub fn new(step_size: StepSize) -> Self {
        Self { step_size }
    }

    pub fn step_size(&self) -> StepSize {
        self.step_size
    }

    fn rate(&self) -> f64 {
        self.step_size.get() * OMEGA
    }

    fn shape(&self, sigma: f64) -> f64 {
        sigma * self.rate()
    }
}

impl Proposal for GammaRandomWalk {
    fn sample<R: Rng + ?Sized>(&self, current: &Theta, rng: &mut R) -> Result<Theta> {
        let k = self.step_size.get();
        let a = Normal::new(current.a(), k)
            .map_err(|e| Error::RandomSource(format!("slope proposal: {e}")))?
            .sample(rng);
        let b = Normal::new(current.b(), k)
            .map_err(|e| Error::RandomSource(format!("intercept proposal: {e}")))?
            .sample(rng);
        let sigma = Gamma::new(self.shape(current.sigma()), 1.0 / self.rate())
            .map_err(|e| Error::RandomSource(format!("sigma proposal: {e}")))?
            .sample(rng);
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::RandomSource(format!(
                "gamma proposal produced sigma = {sigma} from sigma = {}",
                current.sigma()
            )));
        }
        Theta::new(a, b, sigma)
    }

    fn log_prob(&self, from: &Theta, to: &Theta) -> f64 {
        let k = self.step_size.get();
        normal_ln_pdf(to.a(), from.a(), k)
            + normal_ln_pdf(to.b(), from.b(), k)
            + gamma_ln_pdf(to.sigma(), self.shape(from.sigma()), self.rate())
    }
}

/// Draws a starting point: `a, b ~ N(0, 1)` and `sigma ~ Gamma(shape 1, scale 1)`.
pub fn generate_initial_theta<R: Rng + ?Sized>(rng: &mut R) -> Result<Theta> {
    let a: f64 = StandardNormal.sample(rng);
    let b: f64 = StandardNormal.sample(rng);
    let sigma: f64 = Gamma::new(1.0, 1.0)
        .map_err(|e| Error::RandomSource(format!("initial sigma: {e}")))?
        .sample(rng);
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::RandomSource(format!(
            "initial sigma draw was {sigma}"
        )));
    }
    Theta::new(a, b, sigma)
}

/// Proposes a candidate from `theta` with step size `k`. See [`GammaRandomWalk`].
pub fn propose_theta<R: Rng + ?Sized>(theta: &Theta, k: StepSize, rng: &mut R) -> Result<Theta> {
    GammaRandomWalk::new(k).sample(theta, rng)
}

pub fn log_likelihood(data: &Observations, theta: &Theta) -> f64 {
    LinearRegression::new(data).log_likelihood(theta)
}

/// Log-prior with the default slope/intercept scale of [`DEFAULT_PRIOR_SCALE`].
pub fn log_prior(theta: &Theta) -> f64 {
    Prior::default().log_prob(theta)
}

pub fn log_posterior(data: &Observations, theta: &Theta) -> f64 {
    log_likelihood(data, theta) + log_prior(theta)
}

/// Hastings correction `log q(theta | theta_prime) - log q(theta_prime | theta)`.
///
/// The `(a, b)` terms cancel for the symmetric normal walk but are still evaluated.
pub fn proposal_ratio(theta: &Theta, theta_prime: &Theta, k: StepSize) -> f64 {
    log_proposal_ratio(&GammaRandomWalk::new(k), theta, theta_prime)
}

/// `log q(current | proposed) - log q(proposed | current)` for any proposal kernel.
pub fn log_proposal_ratio<Q: Proposal>(proposal: &Q, current: &Theta, proposed: &Theta) -> f64 {
    proposal.log_prob(proposed, current) - proposal.log_prob(current, proposed)
}
