//! Engine facade.
//!
//! Owns one immutable calibration and exposes the four operations behind a
//! single construction point, so callers wire in an alternative calibration
//! (or a test fixture) without touching global state.

use crate::calculator;
use crate::config::CalibrationConfig;
use crate::domain::{
    ComplianceForecast, FacilityProfile, PortfolioPosition, Prediction, SecResult,
};
use crate::error::Result;
use crate::forecast::{batch_compliance_forecast, BatchForecast, BatchOptions, FailurePolicy};
use crate::model::{self, NoiseModel};

pub struct ComplianceEngine {
    config: CalibrationConfig,
    /// Raise implausible results instead of clamping, and abort batches on
    /// the first facility failure
    strict: bool,
}

impl ComplianceEngine {
    pub fn new(config: CalibrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            strict: false,
        })
    }

    /// Strict mode: calibration bugs surface as errors and batch runs abort
    /// on the first failure
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calculate SEC and compliance for one reporting period
    pub fn calculate_sec(
        &self,
        total_energy_mmbtu: f64,
        crude_throughput_mt: f64,
        baseline_sec: f64,
        target_reduction_pct: f64,
    ) -> Result<SecResult> {
        calculator::calculate_sec(
            total_energy_mmbtu,
            crude_throughput_mt,
            baseline_sec,
            target_reduction_pct,
        )
    }

    /// Certificate position at the configured scheme price
    pub fn calculate_escerts(
        &self,
        current_sec: f64,
        target_sec: f64,
        annual_throughput_mt: f64,
    ) -> Result<crate::domain::CertificatePosition> {
        calculator::calculate_escerts(
            current_sec,
            target_sec,
            annual_throughput_mt,
            self.config.economics.escert_price_inr,
            self.config.economics.usd_inr_rate,
        )
    }

    /// Industry-wide certificate balance over per-facility SEC results
    pub fn calculate_portfolio_escerts(
        &self,
        entries: &[(FacilityProfile, SecResult)],
    ) -> Result<PortfolioPosition> {
        calculator::calculate_portfolio_escerts(
            entries,
            self.config.economics.escert_price_inr,
            self.config.economics.usd_inr_rate,
            self.config.economics.capacity_utilization,
        )
    }

    /// Point-estimate SEC reduction for a (cohort, capacity) pair
    pub fn predict_sec_reduction(
        &self,
        entry_cohort: u8,
        capacity_mmtpa: f64,
    ) -> Result<Prediction> {
        model::predict_sec_reduction(
            &self.config.model,
            entry_cohort,
            capacity_mmtpa,
            self.strict,
        )
    }

    /// Monte Carlo compliance probability with the calibrated defaults
    pub fn monte_carlo_compliance(
        &self,
        baseline_sec: f64,
        target_sec: f64,
        predicted_reduction_pct: f64,
        seed: Option<u64>,
    ) -> Result<ComplianceForecast> {
        model::monte_carlo_compliance(
            baseline_sec,
            target_sec,
            predicted_reduction_pct,
            self.config.simulation.default_trials,
            NoiseModel::Gaussian {
                std_dev_pct: self.config.simulation.default_std_dev_pct,
            },
            self.config.simulation.default_confidence_level,
            seed,
        )
    }

    /// Forecast every facility and aggregate the portfolio balance
    pub fn batch_compliance_forecast(
        &self,
        facilities: &[FacilityProfile],
        seed: Option<u64>,
    ) -> Result<BatchForecast> {
        let options = BatchOptions {
            seed,
            policy: if self.strict {
                FailurePolicy::Strict
            } else {
                FailurePolicy::Partial
            },
            strict_plausibility: self.strict,
            ..Default::default()
        };
        batch_compliance_forecast(&self.config, facilities, &options)
    }

    /// Forecast with explicit per-batch options
    pub fn batch_compliance_forecast_with(
        &self,
        facilities: &[FacilityProfile],
        options: &BatchOptions,
    ) -> Result<BatchForecast> {
        batch_compliance_forecast(&self.config, facilities, options)
    }
}
