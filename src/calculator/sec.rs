//! Specific energy consumption.

use crate::domain::SecResult;
use crate::error::{EngineError, Result};

use super::CO2_TONNES_PER_MMBTU;

/// Calculate SEC and compliance against target.
///
/// Current SEC is energy over throughput; the target is the baseline scaled
/// down by the notified reduction. Compliance is `current <= target`.
pub fn calculate_sec(
    total_energy_mmbtu: f64,
    crude_throughput_mt: f64,
    baseline_sec: f64,
    target_reduction_pct: f64,
) -> Result<SecResult> {
    if !(total_energy_mmbtu > 0.0) || !total_energy_mmbtu.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "total_energy_mmbtu",
            value: total_energy_mmbtu,
        });
    }
    if !(crude_throughput_mt > 0.0) || !crude_throughput_mt.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "crude_throughput_mt",
            value: crude_throughput_mt,
        });
    }
    if !(baseline_sec > 0.0) || !baseline_sec.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "baseline_sec",
            value: baseline_sec,
        });
    }

    let current_sec = total_energy_mmbtu / crude_throughput_mt;
    let target_sec = baseline_sec * (1.0 - target_reduction_pct / 100.0);
    let reduction_pct = ((baseline_sec - current_sec) / baseline_sec) * 100.0;

    let energy_savings_mmbtu = (baseline_sec - current_sec) * crude_throughput_mt;
    let co2_avoided_tonnes = energy_savings_mmbtu * CO2_TONNES_PER_MMBTU;

    Ok(SecResult {
        current_sec,
        baseline_sec,
        target_sec,
        reduction_pct,
        is_compliant: current_sec <= target_sec,
        energy_savings_mmbtu,
        co2_avoided_tonnes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_current_sec_is_exact_quotient() {
        let r = calculate_sec(85_000_000.0, 10_000_000.0, 8.33, 5.0).unwrap();
        assert_eq!(r.current_sec, 8.5);
    }

    #[test]
    fn test_refinery_scenario() {
        // baseline 8.33, 5% target => target 7.9135; achieved 8.5 misses it
        let r = calculate_sec(85_000_000.0, 10_000_000.0, 8.33, 5.0).unwrap();
        assert!((r.target_sec - 7.9135).abs() < 1e-9);
        assert!(!r.is_compliant);
        assert!(r.reduction_pct < 0.0); // worse than baseline
    }

    #[test]
    fn test_compliant_facility() {
        // 6.4 achieved against an 8.2 baseline with a 5% target (7.79)
        let r = calculate_sec(64_000_000.0, 10_000_000.0, 8.2, 5.0).unwrap();
        assert!(r.is_compliant);
        assert!((r.reduction_pct - 21.95).abs() < 0.01);
        assert!(r.energy_savings_mmbtu > 0.0);
        assert!((r.co2_avoided_tonnes - r.energy_savings_mmbtu * 0.07).abs() < 1e-6);
    }

    #[rstest]
    #[case(0.0, 1.0, 1.0)]
    #[case(-5.0, 1.0, 1.0)]
    #[case(1.0, 0.0, 1.0)]
    #[case(1.0, -2.0, 1.0)]
    #[case(1.0, 1.0, 0.0)]
    #[case(f64::NAN, 1.0, 1.0)]
    fn test_rejects_nonpositive_inputs(
        #[case] energy: f64,
        #[case] throughput: f64,
        #[case] baseline: f64,
    ) {
        assert!(matches!(
            calculate_sec(energy, throughput, baseline, 5.0),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_compliance_monotonic_in_target() {
        // Tightening the target can only flip compliant -> non-compliant
        let mut prev_compliant = true;
        for target in [0.0, 2.0, 5.0, 10.0, 20.0, 40.0] {
            let r = calculate_sec(70_000_000.0, 10_000_000.0, 8.33, target).unwrap();
            if !prev_compliant {
                assert!(!r.is_compliant);
            }
            prev_compliant = r.is_compliant;
        }
    }
}
