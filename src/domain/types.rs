//! Engine output value types.
//!
//! Everything here is an immutable value created fresh per call and handed to
//! the presentation collaborator; the engine never caches or persists any of
//! these.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a specific-energy-consumption calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecResult {
    /// Achieved SEC (energy / throughput) in MMBTU/MT
    pub current_sec: f64,
    /// Notified baseline SEC in MMBTU/MT
    pub baseline_sec: f64,
    /// Target SEC = baseline * (1 - target/100)
    pub target_sec: f64,
    /// Reduction achieved against baseline (percent, positive = improvement)
    pub reduction_pct: f64,
    /// Whether the achieved SEC meets the target
    pub is_compliant: bool,
    /// Energy saved against baseline over the period (MMBTU)
    pub energy_savings_mmbtu: f64,
    /// CO2 avoided by those savings (tonnes)
    pub co2_avoided_tonnes: f64,
}

impl fmt::Display for SecResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SEC {:.3} vs target {:.3} MMBTU/MT ({})",
            self.current_sec,
            self.target_sec,
            if self.is_compliant {
                "compliant"
            } else {
                "non-compliant"
            }
        )
    }
}

/// Certificate position of a single facility.
///
/// The count is signed: positive = surplus (earns certificates), negative =
/// deficit (must buy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificatePosition {
    /// Signed certificate count in tonnes of oil equivalent
    pub escerts_toe: f64,
    /// Monetary value at the scheme price (INR, signed like the count)
    pub value_inr: f64,
    /// Monetary value at the configured exchange rate (USD, signed)
    pub value_usd: f64,
    /// SEC at which the position flips sign; only reported for deficits
    pub breakeven_sec: Option<f64>,
}

impl CertificatePosition {
    pub fn is_surplus(&self) -> bool {
        self.escerts_toe > 0.0
    }
}

/// One facility's line in a portfolio balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityPosition {
    pub facility_id: String,
    /// Signed certificate count (TOE)
    pub escerts_toe: f64,
    /// Signed value at the scheme price (INR)
    pub value_inr: f64,
}

/// Portfolio-level certificate balance across a facility collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioPosition {
    /// Certificates generated by surplus-holding facilities (TOE, >= 0)
    pub total_generated_toe: f64,
    /// Certificates required by deficit-holding facilities (TOE, >= 0)
    pub total_required_toe: f64,
    /// Net position (generated - required, signed)
    pub net_balance_toe: f64,
    /// Net monetary value at the scheme price (INR, signed)
    pub net_value_inr: f64,
    /// Number of surplus-holding facilities
    pub surplus_count: usize,
    /// Number of deficit-holding facilities
    pub deficit_count: usize,
    /// Per-facility positions, in input order
    pub positions: Vec<FacilityPosition>,
}

impl PortfolioPosition {
    pub fn is_net_surplus(&self) -> bool {
        self.net_balance_toe > 0.0
    }
}

/// Point-estimate output of the effect predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted SEC reduction (percent, signed; negative = improvement)
    pub reduction_pct: f64,
    /// Cohort the prediction was derived from
    pub entry_cohort: u8,
    /// Capacity the prediction was derived from (MMTPA)
    pub capacity_mmtpa: f64,
}

impl Prediction {
    /// SEC the facility is expected to achieve from a given baseline
    pub fn expected_sec(&self, baseline_sec: f64) -> f64 {
        baseline_sec * (1.0 + self.reduction_pct / 100.0)
    }
}

/// Risk classification of a compliance probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    /// Probability >= 0.70
    High,
    /// Probability in [0.40, 0.70)
    Medium,
    /// Probability < 0.40
    AtRisk,
}

impl RiskBand {
    pub fn classify(probability: f64) -> Self {
        if probability >= 0.70 {
            RiskBand::High
        } else if probability >= 0.40 {
            RiskBand::Medium
        } else {
            RiskBand::AtRisk
        }
    }
}

/// Output of one Monte Carlo compliance simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceForecast {
    /// Estimated compliance probability in [0, 1]
    pub probability: f64,
    /// Lower bound of the binomial-proportion interval
    pub ci_low: f64,
    /// Upper bound of the binomial-proportion interval
    pub ci_high: f64,
    /// Confidence level the interval was computed at
    pub confidence_level: f64,
    /// Number of trials run
    pub trials: usize,
    /// Number of trials that landed compliant
    pub compliant_trials: usize,
    /// Sampled achieved-SEC realizations, one per trial
    pub simulated_secs: Vec<f64>,
}

impl ComplianceForecast {
    pub fn risk_band(&self) -> RiskBand {
        RiskBand::classify(self.probability)
    }

    /// Width of the confidence interval
    pub fn ci_width(&self) -> f64 {
        self.ci_high - self.ci_low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_band_thresholds() {
        assert_eq!(RiskBand::classify(0.95), RiskBand::High);
        assert_eq!(RiskBand::classify(0.70), RiskBand::High);
        assert_eq!(RiskBand::classify(0.55), RiskBand::Medium);
        assert_eq!(RiskBand::classify(0.40), RiskBand::Medium);
        assert_eq!(RiskBand::classify(0.10), RiskBand::AtRisk);
    }

    #[test]
    fn test_prediction_expected_sec() {
        let p = Prediction {
            reduction_pct: -20.0,
            entry_cohort: 1,
            capacity_mmtpa: 10.0,
        };
        assert!((p.expected_sec(10.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_sec_result_display() {
        let r = SecResult {
            current_sec: 8.5,
            baseline_sec: 8.33,
            target_sec: 7.9135,
            reduction_pct: -2.04,
            is_compliant: false,
            energy_savings_mmbtu: 0.0,
            co2_avoided_tonnes: 0.0,
        };
        assert_eq!(
            format!("{r}"),
            "SEC 8.500 vs target 7.914 MMBTU/MT (non-compliant)"
        );
    }

    #[test]
    fn test_serialization() {
        let pos = CertificatePosition {
            escerts_toe: -1200.0,
            value_inr: -4_800_000.0,
            value_usd: -57_831.3,
            breakeven_sec: Some(7.5),
        };
        let json = serde_json::to_string(&pos).unwrap();
        let back: CertificatePosition = serde_json::from_str(&json).unwrap();
        assert!(!back.is_surplus());
        assert_eq!(back.breakeven_sec, Some(7.5));
        assert_eq!(back.value_usd, -57_831.3);
    }
}
