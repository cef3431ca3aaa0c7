//! Effect predictor.
//!
//! Applies the calibrated staggered diff-in-diff coefficients to a
//! (cohort, capacity) pair. The model is never re-fitted here; the cohort
//! table and interaction term arrive as calibration constants.

use crate::config::ModelConfig;
use crate::domain::Prediction;
use crate::error::{EngineError, Result};

/// Predict the SEC reduction (percent, signed; negative = improvement) for a
/// facility that entered the scheme in `entry_cohort` with the given
/// nameplate capacity.
///
/// The cohort selects the base treatment effect; the capacity interaction is
/// continuous in log-capacity, vanishing at the reference capacity. An
/// unknown cohort is an error, never a default: defaulting would misstate
/// the regime the facility is actually subject to.
///
/// A prediction outside the plausible band is a calibration bug: raised as
/// [`EngineError::ImplausibleResult`] in strict mode, clamped otherwise.
pub fn predict_sec_reduction(
    model: &ModelConfig,
    entry_cohort: u8,
    capacity_mmtpa: f64,
    strict: bool,
) -> Result<Prediction> {
    if !(capacity_mmtpa > 0.0) || !capacity_mmtpa.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "capacity_mmtpa",
            value: capacity_mmtpa,
        });
    }

    let base = model.cohort_effect(entry_cohort)?;

    let size_term = model.capacity_interaction_log_points
        * (capacity_mmtpa / model.reference_capacity_mmtpa).ln();
    let reduction_pct = (base.effect_log_points + size_term) * 100.0;

    let reduction_pct = if reduction_pct < model.min_reduction_pct
        || reduction_pct > model.max_reduction_pct
    {
        if strict {
            return Err(EngineError::ImplausibleResult {
                what: "predicted_reduction_pct",
                value: reduction_pct,
                low: model.min_reduction_pct,
                high: model.max_reduction_pct,
            });
        }
        reduction_pct.clamp(model.min_reduction_pct, model.max_reduction_pct)
    } else {
        reduction_pct
    };

    Ok(Prediction {
        reduction_pct,
        entry_cohort,
        capacity_mmtpa,
    })
}
