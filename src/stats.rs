//! Provides functions for computing chain statistics: an online tracker used while the
//! chain runs, and a post-burn-in summary of a finished chain.

use ndarray::prelude::*;
use ndarray_stats::{CorrelationExt, QuantileExt};
use std::collections::VecDeque;
use std::fmt;

use crate::error::{Error, Result};
use crate::model::{Theta, PARAM_NAMES};

/// Number of recent transitions the windowed acceptance rate looks at.
pub const ACCEPT_WINDOW: usize = 100;

/// Running mean, variance and acceptance statistics of a single chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTracker {
    n: u64,
    n_accepted: u64,
    mean: Array1<f64>,
    mean_sq: Array1<f64>,
    accept_queue: VecDeque<bool>,
    window_accepted: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    pub n: u64,
    pub p_accept: f64,
    pub window_p_accept: f64,
    pub mean: Array1<f64>,
    pub sm2: Array1<f64>,
}

impl ChainTracker {
    pub fn new() -> Self {
        Self {
            n: 0,
            n_accepted: 0,
            mean: Array1::zeros(PARAM_NAMES.len()),
            mean_sq: Array1::zeros(PARAM_NAMES.len()),
            accept_queue: VecDeque::with_capacity(ACCEPT_WINDOW + 1),
            window_accepted: 0,
        }
    }

    /// Records the state produced by one transition and whether it was an accepted move.
    pub fn step(&mut self, x: &Theta, accepted: bool) {
        self.n += 1;
        self.n_accepted += accepted as u64;

        self.accept_queue.push_back(accepted);
        self.window_accepted += accepted as usize;
        if self.accept_queue.len() > ACCEPT_WINDOW {
            if let Some(true) = self.accept_queue.pop_front() {
                self.window_accepted -= 1;
            }
        }

        let n = self.n as f64;
        let x_arr = arr1(&x.to_array());
        self.mean = (&self.mean * (n - 1.0) + &x_arr) / n;
        self.mean_sq = (&self.mean_sq * (n - 1.0) + x_arr.mapv(|v| v * v)) / n;
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    /// Fraction of all recorded transitions that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.n_accepted as f64 / self.n as f64
        }
    }

    /// Fraction of the last [`ACCEPT_WINDOW`] transitions that were accepted.
    pub fn window_acceptance_rate(&self) -> f64 {
        if self.accept_queue.is_empty() {
            0.0
        } else {
            self.window_accepted as f64 / self.accept_queue.len() as f64
        }
    }

    /// Unbiased per-parameter variance of the recorded states.
    pub fn sm2(&self) -> Array1<f64> {
        if self.n < 2 {
            return Array1::zeros(PARAM_NAMES.len());
        }
        let n = self.n as f64;
        (&self.mean_sq - &self.mean.mapv(|m| m * m)) * n / (n - 1.0)
    }

    pub fn stats(&self) -> ChainStats {
        ChainStats {
            n: self.n,
            p_accept: self.acceptance_rate(),
            window_p_accept: self.window_acceptance_rate(),
            mean: self.mean.clone(),
            sm2: self.sm2(),
        }
    }
}

impl Default for ChainTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSummary {
    pub name: &'static str,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary of the samples kept after burn-in.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSummary {
    pub burn_in: usize,
    pub n_samples: usize,
    /// Fraction of kept transitions where the state moved.
    pub acceptance_rate: f64,
    pub params: Vec<ParamSummary>,
    /// Sample covariance of `(a, b, sigma)`.
    pub cov: Array2<f64>,
}

/// Stacks a chain into an `(n, 3)` array with columns `a`, `b`, `sigma`.
pub fn to_array(chain: &[Theta]) -> Array2<f64> {
    Array2::from_shape_fn((chain.len(), PARAM_NAMES.len()), |(i, j)| {
        chain[i].to_array()[j]
    })
}

/// Summarizes `chain[burn_in..]`. At least two samples must remain after burn-in.
pub fn summarize(chain: &[Theta], burn_in: usize) -> Result<ChainSummary> {
    let kept = chain.get(burn_in..).unwrap_or(&[]);
    if kept.len() < 2 {
        return Err(Error::InvalidConfig(format!(
            "burn-in of {burn_in} leaves {} of {} samples; need at least 2",
            kept.len(),
            chain.len()
        )));
    }

    let samples = to_array(kept);
    let mean = samples
        .mean_axis(Axis(0))
        .ok_or_else(|| Error::InvalidData("mean of empty chain".into()))?;
    let std = samples.std_axis(Axis(0), 1.0);

    let mut params = Vec::with_capacity(PARAM_NAMES.len());
    for (j, name) in PARAM_NAMES.iter().enumerate() {
        let column = samples.column(j);
        let min = *column.min().map_err(|e| Error::InvalidData(e.to_string()))?;
        let max = *column.max().map_err(|e| Error::InvalidData(e.to_string()))?;
        params.push(ParamSummary {
            name: *name,
            mean: mean[j],
            std: std[j],
            min,
            max,
        });
    }

    let cov = samples
        .t()
        .cov(1.0)
        .map_err(|e| Error::InvalidData(e.to_string()))?;

    let moves = kept.windows(2).filter(|w| w[0] != w[1]).count();
    let acceptance_rate = moves as f64 / (kept.len() - 1) as f64;

    Ok(ChainSummary {
        burn_in,
        n_samples: kept.len(),
        acceptance_rate,
        params,
        cov,
    })
}

impl fmt::Display for ChainSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "N_burn_in = {}", self.burn_in)?;
        writeln!(f, "N_samples = {}", self.n_samples)?;
        writeln!(f, "acceptance rate = {:.3}", self.acceptance_rate)?;
        writeln!(
            f,
            "{:>6} {:>12} {:>12} {:>12} {:>12}",
            "", "mean", "std", "min", "max"
        )?;
        for p in &self.params {
            writeln!(
                f,
                "{:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                p.name, p.mean, p.std, p.min, p.max
            )?;
        }
        Ok(())
    }
}
