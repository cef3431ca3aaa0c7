//! Predictive model application: the fitted staggered diff-in-diff
//! specification and the Monte Carlo compliance simulator built on top of it.

pub mod montecarlo;
pub mod predictor;

pub use montecarlo::*;
pub use predictor::*;
