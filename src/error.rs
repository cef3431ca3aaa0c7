//! Engine-wide error types.
//!
//! Every fallible operation in the engine returns [`EngineError`]. Errors are
//! raised to the immediate caller; nothing is swallowed into a default value,
//! since a silently-defaulted cohort or clamped figure would misstate a
//! facility's regulatory exposure.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the compliance engine
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum EngineError {
    /// A physically meaningless input (non-positive throughput, energy,
    /// baseline SEC or capacity)
    #[error("invalid input: {field} = {value} (must be > 0)")]
    InvalidInput { field: &'static str, value: f64 },

    /// Entry cohort outside the calibrated cohort set
    #[error("unknown entry cohort {cohort}: calibration covers cohorts {min}..={max}")]
    UnknownCohort { cohort: u8, min: u8, max: u8 },

    /// Simulation or calibration configuration is unusable
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A computed reduction or SEC fell outside the physically sane bound.
    /// Signals a calibration bug rather than bad input; raised in strict
    /// mode, clamped otherwise.
    #[error("implausible result: {what} = {value} outside [{low}, {high}]")]
    ImplausibleResult {
        what: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
