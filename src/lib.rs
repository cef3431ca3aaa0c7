//! Predictive compliance modeling engine for PAT-style tradable
//! energy-efficiency certificate schemes.
//!
//! The engine has three algorithmic parts and a batch layer over them:
//!
//! - [`calculator`] — deterministic unit economics: specific energy
//!   consumption (SEC) and tradable certificate (ESCert) accounting
//! - [`model`] — applies a fitted staggered diff-in-diff specification to a
//!   (cohort, capacity) pair, and simulates around the point estimate to get
//!   a compliance probability with confidence bounds
//! - [`forecast`] — runs the pipeline across a facility collection in
//!   parallel and folds the portfolio certificate balance
//!
//! Everything is a pure computation over immutable inputs; data loading,
//! persistence and presentation belong to the caller.

pub mod calculator;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod model;

pub use config::{CalibrationConfig, CohortEffect, EconomicsConfig, ModelConfig, SimulationConfig};
pub use domain::{
    CertificatePosition, ComplianceForecast, FacilityPosition, FacilityProfile, PortfolioPosition,
    Prediction, RiskBand, SecResult,
};
pub use engine::ComplianceEngine;
pub use error::{EngineError, Result};
pub use forecast::{BatchForecast, BatchOptions, FacilityForecast, FacilityOutcome, FailurePolicy};
pub use model::NoiseModel;
