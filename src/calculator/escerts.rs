//! Tradable certificate (ESCert) economics.

use crate::domain::{
    CertificatePosition, FacilityPosition, FacilityProfile, PortfolioPosition, SecResult,
};
use crate::error::{EngineError, Result};

use super::MMBTU_PER_TOE;

/// Calculate the signed certificate position from an achieved vs target SEC
/// gap scaled by annual throughput.
///
/// Positive count = surplus (facility earns certificates), negative =
/// deficit. A zero gap is a valid zero position, not an error.
pub fn calculate_escerts(
    current_sec: f64,
    target_sec: f64,
    annual_throughput_mt: f64,
    escert_price_inr: f64,
    usd_inr_rate: f64,
) -> Result<CertificatePosition> {
    if !(current_sec > 0.0) || !current_sec.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "current_sec",
            value: current_sec,
        });
    }
    if !(target_sec > 0.0) || !target_sec.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "target_sec",
            value: target_sec,
        });
    }
    if !(annual_throughput_mt > 0.0) || !annual_throughput_mt.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "annual_throughput_mt",
            value: annual_throughput_mt,
        });
    }
    if !(usd_inr_rate > 0.0) || !usd_inr_rate.is_finite() {
        return Err(EngineError::InvalidInput {
            field: "usd_inr_rate",
            value: usd_inr_rate,
        });
    }

    let overachievement = target_sec - current_sec;
    let escerts_toe = overachievement * annual_throughput_mt / MMBTU_PER_TOE;
    let value_inr = escerts_toe * escert_price_inr;

    Ok(CertificatePosition {
        escerts_toe,
        value_inr,
        value_usd: value_inr / usd_inr_rate,
        breakeven_sec: if overachievement < 0.0 {
            Some(target_sec)
        } else {
            None
        },
    })
}

/// Commutative fold of per-facility positions into a portfolio balance.
/// Totals are summation only, so they are independent of input order; the
/// per-facility lines are kept in input order for the caller.
pub fn aggregate_positions(entries: &[FacilityPosition]) -> PortfolioPosition {
    let mut portfolio = PortfolioPosition::default();
    for entry in entries {
        if entry.escerts_toe > 0.0 {
            portfolio.total_generated_toe += entry.escerts_toe;
            portfolio.surplus_count += 1;
        } else if entry.escerts_toe < 0.0 {
            portfolio.total_required_toe += entry.escerts_toe.abs();
            portfolio.deficit_count += 1;
        }
        portfolio.net_balance_toe += entry.escerts_toe;
        portfolio.net_value_inr += entry.value_inr;
    }
    portfolio.positions = entries.to_vec();
    portfolio
}

/// Calculate the industry-wide certificate balance from per-facility SEC
/// results.
pub fn calculate_portfolio_escerts(
    entries: &[(FacilityProfile, SecResult)],
    escert_price_inr: f64,
    usd_inr_rate: f64,
    capacity_utilization: f64,
) -> Result<PortfolioPosition> {
    let positions = entries
        .iter()
        .map(|(facility, sec)| {
            let position = calculate_escerts(
                sec.current_sec,
                sec.target_sec,
                facility.annual_throughput_mt(capacity_utilization),
                escert_price_inr,
                usd_inr_rate,
            )?;
            Ok(FacilityPosition {
                facility_id: facility.id.clone(),
                escerts_toe: position.escerts_toe,
                value_inr: position.value_inr,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(aggregate_positions(&positions))
}
