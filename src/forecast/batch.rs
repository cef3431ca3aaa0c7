//! Batch compliance forecasting.
//!
//! Runs the predict -> simulate -> certificate pipeline across a facility
//! collection on the rayon pool. Facilities are independent, so one
//! facility's failure never contaminates another's forecast; the failure
//! policy decides whether it aborts the batch or rides along as a marker.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calculator::{aggregate_positions, calculate_escerts};
use crate::config::CalibrationConfig;
use crate::domain::{
    CertificatePosition, ComplianceForecast, FacilityPosition, FacilityProfile, PortfolioPosition,
    Prediction, RiskBand,
};
use crate::error::{EngineError, Result};
use crate::model::{monte_carlo_compliance, predict_sec_reduction, NoiseModel};

/// What a facility-level failure does to the rest of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FailurePolicy {
    /// Report the failure alongside the successful forecasts
    #[default]
    Partial,
    /// First failure aborts the whole batch
    Strict,
}

/// Per-batch knobs; anything unset falls back to the calibration defaults
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub trials: Option<usize>,
    pub noise_model: Option<NoiseModel>,
    pub confidence_level: Option<f64>,
    /// Master seed; each facility derives its own sub-seed from this and a
    /// stable hash of its id, so batch runs reproduce facility by facility
    pub seed: Option<u64>,
    pub policy: FailurePolicy,
    /// Raise rather than clamp implausible predictions
    pub strict_plausibility: bool,
}

/// Completed forecast for one facility
#[derive(Debug, Clone, Serialize)]
pub struct FacilityForecast {
    pub facility_id: String,
    pub baseline_sec: f64,
    pub target_sec: f64,
    pub prediction: Prediction,
    /// SEC the facility is expected to achieve under the point estimate
    pub predicted_sec: f64,
    pub compliance: ComplianceForecast,
    pub position: CertificatePosition,
    pub risk: RiskBand,
}

/// Outcome slot for one facility, in input order
#[derive(Debug, Clone, Serialize)]
pub struct FacilityOutcome {
    pub facility_id: String,
    pub result: std::result::Result<FacilityForecast, EngineError>,
}

/// Batch result: input-ordered per-facility outcomes plus the portfolio
/// certificate balance folded over the successes
#[derive(Debug, Clone, Serialize)]
pub struct BatchForecast {
    pub generated_at: DateTime<Utc>,
    pub outcomes: Vec<FacilityOutcome>,
    pub portfolio: PortfolioPosition,
    pub succeeded: usize,
    pub failed: usize,
}

/// FNV-1a over the facility id. Stable across releases, unlike the standard
/// library's default hasher, which the reproducibility contract rules out.
fn facility_hash(id: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in id.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn forecast_one(
    config: &CalibrationConfig,
    facility: &FacilityProfile,
    options: &BatchOptions,
) -> Result<FacilityForecast> {
    let cohort = config.cohort_effect(facility.entry_cohort)?;
    let target_reduction_pct = facility
        .target_reduction_pct
        .unwrap_or(cohort.target_reduction_pct);
    let target_sec = facility.baseline_sec * (1.0 - target_reduction_pct / 100.0);

    let prediction = predict_sec_reduction(
        &config.model,
        facility.entry_cohort,
        facility.capacity_mmtpa,
        options.strict_plausibility,
    )?;
    let predicted_sec = prediction.expected_sec(facility.baseline_sec);

    let trials = options.trials.unwrap_or(config.simulation.default_trials);
    let noise_model = options.noise_model.unwrap_or(NoiseModel::Gaussian {
        std_dev_pct: config.simulation.default_std_dev_pct,
    });
    let confidence_level = options
        .confidence_level
        .unwrap_or(config.simulation.default_confidence_level);
    let facility_seed = options
        .seed
        .map(|s| s.wrapping_add(facility_hash(&facility.id)));

    let compliance = monte_carlo_compliance(
        facility.baseline_sec,
        target_sec,
        prediction.reduction_pct,
        trials,
        noise_model,
        confidence_level,
        facility_seed,
    )?;

    let position = calculate_escerts(
        predicted_sec,
        target_sec,
        facility.annual_throughput_mt(config.economics.capacity_utilization),
        config.economics.escert_price_inr,
        config.economics.usd_inr_rate,
    )?;

    let risk = compliance.risk_band();
    debug!(
        facility = %facility.id,
        probability = compliance.probability,
        escerts_toe = position.escerts_toe,
        "facility forecast complete"
    );

    Ok(FacilityForecast {
        facility_id: facility.id.clone(),
        baseline_sec: facility.baseline_sec,
        target_sec,
        prediction,
        predicted_sec,
        compliance,
        position,
        risk,
    })
}

/// Forecast compliance for every facility and aggregate the portfolio
/// certificate balance.
///
/// The output preserves the input facility order regardless of how the rayon
/// pool schedules the work. An empty collection yields an empty forecast with
/// a zero portfolio.
pub fn batch_compliance_forecast(
    config: &CalibrationConfig,
    facilities: &[FacilityProfile],
    options: &BatchOptions,
) -> Result<BatchForecast> {
    let outcomes: Vec<FacilityOutcome> = facilities
        .par_iter()
        .map(|facility| FacilityOutcome {
            facility_id: facility.id.clone(),
            result: forecast_one(config, facility, options),
        })
        .collect();

    if options.policy == FailurePolicy::Strict {
        if let Some(outcome) = outcomes.iter().find(|o| o.result.is_err()) {
            let err = outcome.result.as_ref().unwrap_err().clone();
            warn!(facility = %outcome.facility_id, %err, "aborting batch (strict policy)");
            return Err(err);
        }
    }

    let positions: Vec<FacilityPosition> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .map(|f| FacilityPosition {
            facility_id: f.facility_id.clone(),
            escerts_toe: f.position.escerts_toe,
            value_inr: f.position.value_inr,
        })
        .collect();
    let portfolio = aggregate_positions(&positions);

    let succeeded = positions.len();
    let failed = outcomes.len() - succeeded;
    if failed > 0 {
        warn!(succeeded, failed, "batch completed with failures");
    }

    Ok(BatchForecast {
        generated_at: Utc::now(),
        outcomes,
        portfolio,
        succeeded,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CalibrationConfig {
        CalibrationConfig::default()
    }

    fn facilities() -> Vec<FacilityProfile> {
        vec![
            FacilityProfile::new("IOCL Panipat", 15.0, 8.2, 1).unwrap(),
            FacilityProfile::new("IOCL Guwahati", 1.0, 9.1, 2).unwrap(),
            FacilityProfile::new("CPCL Nagapattinam", 1.0, 8.6, 3).unwrap(),
        ]
    }

    fn seeded_options() -> BatchOptions {
        BatchOptions {
            trials: Some(2000),
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let batch = batch_compliance_forecast(&config(), &facilities(), &seeded_options()).unwrap();
        let ids: Vec<_> = batch.outcomes.iter().map(|o| o.facility_id.as_str()).collect();
        assert_eq!(ids, ["IOCL Panipat", "IOCL Guwahati", "CPCL Nagapattinam"]);
        assert_eq!(batch.succeeded, 3);
        assert_eq!(batch.failed, 0);
    }

    #[test]
    fn test_batch_is_reproducible_with_seed() {
        let a = batch_compliance_forecast(&config(), &facilities(), &seeded_options()).unwrap();
        let b = batch_compliance_forecast(&config(), &facilities(), &seeded_options()).unwrap();
        for (x, y) in a.outcomes.iter().zip(b.outcomes.iter()) {
            let (fx, fy) = (x.result.as_ref().unwrap(), y.result.as_ref().unwrap());
            assert_eq!(fx.compliance.probability, fy.compliance.probability);
            assert_eq!(fx.compliance.ci_low, fy.compliance.ci_low);
        }
        assert!((a.portfolio.net_balance_toe - b.portfolio.net_balance_toe).abs() < 1e-9);
    }

    #[test]
    fn test_early_entrant_forecast_beats_late() {
        let batch = batch_compliance_forecast(&config(), &facilities(), &seeded_options()).unwrap();
        let early = batch.outcomes[0].result.as_ref().unwrap();
        let late = batch.outcomes[2].result.as_ref().unwrap();
        assert!(early.prediction.reduction_pct < late.prediction.reduction_pct);
        assert!(early.compliance.probability > late.compliance.probability);
        assert_eq!(early.risk, RiskBand::High);
    }

    #[test]
    fn test_portfolio_lists_successful_facilities() {
        let batch = batch_compliance_forecast(&config(), &facilities(), &seeded_options()).unwrap();
        let ids: Vec<_> = batch
            .portfolio
            .positions
            .iter()
            .map(|p| p.facility_id.as_str())
            .collect();
        assert_eq!(ids, ["IOCL Panipat", "IOCL Guwahati", "CPCL Nagapattinam"]);
        for (position, outcome) in batch.portfolio.positions.iter().zip(&batch.outcomes) {
            let forecast = outcome.result.as_ref().unwrap();
            assert_eq!(position.escerts_toe, forecast.position.escerts_toe);
            assert_eq!(position.value_inr, forecast.position.value_inr);
        }
    }

    #[test]
    fn test_partial_failure_marks_only_offender() {
        let mut facs = facilities();
        facs[1].entry_cohort = 99;
        let batch = batch_compliance_forecast(&config(), &facs, &seeded_options()).unwrap();
        assert_eq!(batch.succeeded, 2);
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.portfolio.positions.len(), 2);
        assert!(batch.outcomes[0].result.is_ok());
        assert!(matches!(
            batch.outcomes[1].result,
            Err(EngineError::UnknownCohort { cohort: 99, .. })
        ));
        assert!(batch.outcomes[2].result.is_ok());
    }

    #[test]
    fn test_strict_policy_aborts_batch() {
        let mut facs = facilities();
        facs[1].entry_cohort = 99;
        let options = BatchOptions {
            policy: FailurePolicy::Strict,
            ..seeded_options()
        };
        let err = batch_compliance_forecast(&config(), &facs, &options).unwrap_err();
        assert!(matches!(err, EngineError::UnknownCohort { cohort: 99, .. }));
    }

    #[test]
    fn test_empty_batch_is_zero_portfolio() {
        let batch = batch_compliance_forecast(&config(), &[], &seeded_options()).unwrap();
        assert!(batch.outcomes.is_empty());
        assert_eq!(batch.succeeded, 0);
        assert_eq!(batch.failed, 0);
        assert_eq!(batch.portfolio.net_balance_toe, 0.0);
    }

    #[test]
    fn test_facility_target_override_applies() {
        let cfg = config();
        let default_run = batch_compliance_forecast(
            &cfg,
            &[FacilityProfile::new("X", 10.0, 8.0, 1).unwrap()],
            &seeded_options(),
        )
        .unwrap();
        let override_run = batch_compliance_forecast(
            &cfg,
            &[FacilityProfile::new("X", 10.0, 8.0, 1)
                .unwrap()
                .with_target_reduction(20.0)],
            &seeded_options(),
        )
        .unwrap();
        let d = default_run.outcomes[0].result.as_ref().unwrap();
        let o = override_run.outcomes[0].result.as_ref().unwrap();
        assert!(o.target_sec < d.target_sec);
        // Tighter target can only lower the compliance probability
        assert!(o.compliance.probability <= d.compliance.probability);
    }

    #[test]
    fn test_facility_hash_is_stable() {
        // FNV-1a reference value for "a"
        assert_eq!(facility_hash("a"), 0xaf63dc4c8601ec8c);
        assert_eq!(facility_hash(""), 0xcbf29ce484222325);
    }
}
