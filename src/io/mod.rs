//! Observation sources: delimited text tables (feature `csv`) and seeded synthetic data.

#[cfg(feature = "csv")]
pub mod csv;

pub mod synthetic;
