pub mod config;
pub mod core;
pub mod distributions;
pub mod error;
pub mod io;
pub mod metropolis_hastings;
pub mod model;
pub mod stats;

pub use distributions::{
    generate_initial_theta, log_likelihood, log_posterior, log_prior, proposal_ratio,
    propose_theta, OMEGA,
};
pub use error::{Error, Result};
pub use metropolis_hastings::step;
pub use model::{Observations, StepSize, Theta};
