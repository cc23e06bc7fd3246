//! Run configuration for a single chain.

use crate::distributions::{Prior, DEFAULT_PRIOR_SCALE};
use crate::error::{Error, Result};
use crate::model::StepSize;

/// Settings a driver needs to run one chain and summarize it.
///
/// ```rust
/// use linreg_mcmc::config::SamplerConfig;
///
/// let config = SamplerConfig::default()
///     .iterations(5_000)
///     .burn_in(500)
///     .step_size(0.05)
///     .set_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Length of the chain, including the initial state.
    pub iterations: usize,
    /// Number of leading samples dropped before summarizing.
    pub burn_in: usize,
    /// Proposal width `k`.
    pub step_size: f64,
    /// Prior standard deviation of slope and intercept.
    pub prior_scale: f64,
    /// Report cadence, in iterations.
    pub report_every: usize,
    /// Seed for the chain's RNG; drawn from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            burn_in: 1_000,
            step_size: 0.1,
            prior_scale: DEFAULT_PRIOR_SCALE,
            report_every: 20,
            seed: None,
        }
    }
}

impl SamplerConfig {
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn burn_in(mut self, burn_in: usize) -> Self {
        self.burn_in = burn_in;
        self
    }

    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn prior_scale(mut self, prior_scale: f64) -> Self {
        self.prior_scale = prior_scale;
        self
    }

    pub fn report_every(mut self, report_every: usize) -> Self {
        self.report_every = report_every;
        self
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Seed for data generated next to a seeded chain. It differs from the chain seed so
    /// the data noise and the chain draw from separate streams.
    pub fn data_seed(&self) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(1))
    }

    /// Checks every field and returns the validated step size and prior.
    pub fn validate(&self) -> Result<(StepSize, Prior)> {
        if self.iterations < 2 {
            return Err(Error::InvalidConfig(format!(
                "iterations must be at least 2, got {}",
                self.iterations
            )));
        }
        if self.burn_in > self.iterations - 2 {
            return Err(Error::InvalidConfig(format!(
                "burn-in {} must leave at least 2 of {} iterations",
                self.burn_in, self.iterations
            )));
        }
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be > 0".into()));
        }
        let step_size = StepSize::new(self.step_size)?;
        let prior = Prior::new(self.prior_scale)?;
        Ok((step_size, prior))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SamplerConfig::default();
        let (k, prior) = config.validate().unwrap();
        assert_eq!(k.get(), 0.1);
        assert_eq!(prior.scale(), 100.0);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn burn_in_must_leave_samples() {
        let config = SamplerConfig::default().iterations(100).burn_in(99);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(SamplerConfig::default()
            .iterations(100)
            .burn_in(98)
            .validate()
            .is_ok());
        assert!(matches!(
            SamplerConfig::default().burn_in(usize::MAX).validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn data_seed_is_derived_from_chain_seed() {
        assert_eq!(SamplerConfig::default().data_seed(), None);
        let config = SamplerConfig::default().set_seed(u64::MAX);
        assert_eq!(config.data_seed(), Some(0));
        assert_ne!(config.data_seed(), config.seed);
    }

    #[test]
    fn step_size_and_prior_are_checked() {
        assert!(matches!(
            SamplerConfig::default().step_size(0.0).validate(),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            SamplerConfig::default().prior_scale(-1.0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(SamplerConfig::default().report_every(0).validate().is_err());
    }
}
