//! # Calibration
//!
//! Physical formulas that turn raw power counts plus calibration and
//! environment constants into range, volume backscattering strength (Sv) and
//! point backscattering strength (Sp).
//!
//! ```text
//! Sv = EL - 2.5/DS + N/(26214*DS) - TVR - 20log10(VTX) + 20log10(R) + 2aR
//!      - 10log10(0.5*c*tau*psi) + Sv_offset
//! Sp = EL - 2.5/DS + N/(26214*DS) - TVR - 20log10(VTX) + 40log10(R) + 2aR
//! ```
//!
//! All formulas are elementwise over (channel, ping_time, range_sample) and
//! free of hidden state: calibrating the same record twice yields identical
//! arrays.

mod engine;
mod error;
pub mod params;
mod result;

#[cfg(test)]
mod tests;

pub use engine::{legacy_range, point_backscattering, volume_backscattering, CalibrationEngine};
pub use error::CalibrationError;
pub use params::{CalibrationParameters, EnvironmentParameters, ParamValue};
pub use result::{CalibratedResult, Quantity, RangeProfile};
pub(crate) use result::RangeInputs;
