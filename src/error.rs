//! Error type shared by the sampler, the data loaders and the configuration layer.
//!
//! Every variant is fatal for the run that produced it: they signal either a broken
//! precondition (bad θ, bad step size, malformed data) or a random source that could
//! not deliver a usable draw. Nothing here is meant to be retried.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The noise scale of a parameter vector was not strictly positive and finite.
    #[error("invalid noise scale sigma = {sigma}: must be finite and > 0")]
    InvalidParameter { sigma: f64 },

    /// Slope or intercept was NaN or infinite.
    #[error("invalid parameter vector (a = {a}, b = {b}): slope and intercept must be finite")]
    InvalidTheta { a: f64, b: f64 },

    /// The proposal step size was not strictly positive and finite.
    #[error("invalid step size k = {step_size}: must be finite and > 0")]
    InvalidArgument { step_size: f64 },

    /// A distribution could not be constructed or produced an unusable draw.
    #[error("random source failure: {0}")]
    RandomSource(String),

    /// The observation table is malformed.
    #[error("invalid observations: {0}")]
    InvalidData(String),

    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
