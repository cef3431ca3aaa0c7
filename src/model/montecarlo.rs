//! Monte Carlo compliance simulator.
//!
//! A point-estimate reduction hides estimation uncertainty. The simulator
//! treats the predicted reduction as the mean of a noise distribution, draws
//! independent reduction samples, scores each through the SEC compliance
//! rule, and reports the compliant share with a binomial-proportion interval.
//!
//! Determinism contract: every trial seeds its own `StdRng` from a sub-seed
//! derived from the trial index, so a seeded run is bit-reproducible whether
//! the trial loop executes sequentially or across the rayon pool.

use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::ContinuousCDF;
use tracing::debug;

use crate::domain::ComplianceForecast;
use crate::error::{EngineError, Result};

/// Distribution family for the estimation error around a predicted reduction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoiseModel {
    /// Gaussian noise with the given standard deviation (pct points)
    Gaussian { std_dev_pct: f64 },
    /// Uniform noise on [-half_width, +half_width] (pct points)
    Uniform { half_width_pct: f64 },
}

impl NoiseModel {
    fn validate(&self) -> Result<()> {
        let spread = self.spread();
        if spread < 0.0 || !spread.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "noise spread must be >= 0 and finite, got {spread}"
            )));
        }
        Ok(())
    }

    fn spread(&self) -> f64 {
        match self {
            NoiseModel::Gaussian { std_dev_pct } => *std_dev_pct,
            NoiseModel::Uniform { half_width_pct } => *half_width_pct,
        }
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            NoiseModel::Gaussian { std_dev_pct } => {
                // spread checked > 0 before any sampling happens
                let normal = Normal::new(0.0, *std_dev_pct).unwrap();
                normal.sample(rng)
            }
            NoiseModel::Uniform { half_width_pct } => {
                let uniform = Uniform::new_inclusive(-half_width_pct, *half_width_pct);
                uniform.sample(rng)
            }
        }
    }
}

/// Splitmix64 over the trial index: independent, reproducible sub-seeds
/// regardless of how trials are scheduled across threads.
fn trial_seed(master_seed: u64, trial: u64) -> u64 {
    let mut z = master_seed.wrapping_add(trial.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Wilson score interval for a binomial proportion.
///
/// Closed-form, no second randomness source, and well-behaved near p = 0
/// and p = 1 where the normal approximation collapses.
fn wilson_interval(successes: usize, trials: usize, confidence_level: f64) -> (f64, f64) {
    let n = trials as f64;
    let p = successes as f64 / n;
    let alpha = 1.0 - confidence_level;
    let z = statrs::distribution::Normal::new(0.0, 1.0)
        .unwrap()
        .inverse_cdf(1.0 - alpha / 2.0);

    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;

    ((center - half).max(0.0), (center + half).min(1.0))
}

/// Run `trials` noisy realizations of a predicted reduction through the
/// compliance rule and estimate the compliance probability.
///
/// With an explicit `seed` the result is bit-reproducible; without one a
/// master seed is drawn from entropy and results vary run to run by design.
/// A zero-spread noise model degenerates to a deterministic 0-or-1 outcome
/// with a collapsed interval.
#[allow(clippy::too_many_arguments)]
pub fn monte_carlo_compliance(
    baseline_sec: f64,
    target_sec: f64,
    predicted_reduction_pct: f64,
    trials: usize,
    noise_model: NoiseModel,
    confidence_level: f64,
    seed: Option<u64>,
) -> Result<ComplianceForecast> {
    if !(baseline_sec > 0.0) || !baseline_sec.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "baseline_sec",
            value: baseline_sec,
        });
    }
    if !(target_sec > 0.0) || !target_sec.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "target_sec",
            value: target_sec,
        });
    }
    if trials == 0 {
        return Err(EngineError::InvalidConfig(
            "trial count must be > 0".to_string(),
        ));
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(EngineError::InvalidConfig(format!(
            "confidence level must be in (0, 1), got {confidence_level}"
        )));
    }
    noise_model.validate()?;

    // Zero spread: no randomness, the point estimate decides outright
    if noise_model.spread() == 0.0 {
        let achieved_sec = baseline_sec * (1.0 + predicted_reduction_pct / 100.0);
        let compliant = achieved_sec <= target_sec;
        let probability = if compliant { 1.0 } else { 0.0 };
        return Ok(ComplianceForecast {
            probability,
            ci_low: probability,
            ci_high: probability,
            confidence_level,
            trials,
            compliant_trials: if compliant { trials } else { 0 },
            simulated_secs: vec![achieved_sec; trials],
        });
    }

    let master_seed = seed.unwrap_or_else(rand::random);

    let simulated_secs: Vec<f64> = (0..trials as u64)
        .into_par_iter()
        .map(|trial| {
            let mut rng = StdRng::seed_from_u64(trial_seed(master_seed, trial));
            let reduction = predicted_reduction_pct + noise_model.sample(&mut rng);
            baseline_sec * (1.0 + reduction / 100.0)
        })
        .collect();

    let compliant_trials = simulated_secs.iter().filter(|&&s| s <= target_sec).count();
    let probability = compliant_trials as f64 / trials as f64;
    let (ci_low, ci_high) = wilson_interval(compliant_trials, trials, confidence_level);

    debug!(
        trials,
        compliant_trials, probability, ci_low, ci_high, "compliance simulation complete"
    );

    Ok(ComplianceForecast {
        probability,
        ci_low,
        ci_high,
        confidence_level,
        trials,
        compliant_trials,
        simulated_secs,
    })
}
