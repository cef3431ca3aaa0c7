//! Facility profile records.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A regulated facility as supplied by the data collaborator.
///
/// Immutable once constructed; malformed records are rejected here, at the
/// boundary, rather than deep inside a calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityProfile {
    /// Unique identifier (e.g. "IOCL Panipat")
    pub id: String,
    /// Nameplate capacity in MMTPA
    pub capacity_mmtpa: f64,
    /// Notified baseline SEC in MMBTU/MT
    pub baseline_sec: f64,
    /// Regulatory cycle in which the facility entered the scheme
    pub entry_cohort: u8,
    /// Facility-specific target reduction override (percent); when absent
    /// the cohort's notified target applies
    pub target_reduction_pct: Option<f64>,
}

impl FacilityProfile {
    pub fn new(
        id: impl Into<String>,
        capacity_mmtpa: f64,
        baseline_sec: f64,
        entry_cohort: u8,
    ) -> Result<Self> {
        if !(capacity_mmtpa > 0.0) || !capacity_mmtpa.is_finite() {
            return Err(EngineError::InvalidInput {
                field: "capacity_mmtpa",
                value: capacity_mmtpa,
            });
        }
        if !(baseline_sec > 0.0) || !baseline_sec.is_finite() {
            return Err(EngineError::InvalidInput {
                field: "baseline_sec",
                value: baseline_sec,
            });
        }
        Ok(Self {
            id: id.into(),
            capacity_mmtpa,
            baseline_sec,
            entry_cohort,
            target_reduction_pct: None,
        })
    }

    /// Override the cohort-notified target reduction for this facility
    pub fn with_target_reduction(mut self, target_reduction_pct: f64) -> Self {
        self.target_reduction_pct = Some(target_reduction_pct);
        self
    }

    /// Annual crude throughput in MT at the given utilization factor
    pub fn annual_throughput_mt(&self, utilization: f64) -> f64 {
        self.capacity_mmtpa * 1e6 * utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_profile() {
        let f = FacilityProfile::new("IOCL Panipat", 15.0, 8.2, 1).unwrap();
        assert_eq!(f.entry_cohort, 1);
        assert!(f.target_reduction_pct.is_none());
    }

    #[test]
    fn test_rejects_nonpositive_capacity() {
        let err = FacilityProfile::new("X", 0.0, 8.2, 1).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput {
                field: "capacity_mmtpa",
                value: 0.0
            }
        );
    }

    #[test]
    fn test_rejects_nonpositive_baseline() {
        assert!(FacilityProfile::new("X", 10.0, -1.0, 1).is_err());
        assert!(FacilityProfile::new("X", 10.0, f64::NAN, 1).is_err());
    }

    #[test]
    fn test_annual_throughput() {
        let f = FacilityProfile::new("X", 10.0, 8.0, 1).unwrap();
        assert!((f.annual_throughput_mt(0.85) - 8_500_000.0).abs() < 1e-6);
    }
}
