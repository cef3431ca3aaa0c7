//! Deterministic unit-economics calculations: SEC figures and tradable
//! certificate accounting. Pure functions, no state.

pub mod escerts;
pub mod sec;

pub use escerts::*;
pub use sec::*;

/// MMBTU per tonne of oil equivalent
pub const MMBTU_PER_TOE: f64 = 41.868;

/// Tonnes of CO2 emitted per MMBTU of refinery fuel
pub const CO2_TONNES_PER_MMBTU: f64 = 0.07;
