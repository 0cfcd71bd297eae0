use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};

/// Calibrated acoustic quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quantity {
    /// Volume backscattering strength
    Sv,
    /// Point backscattering strength
    Sp,
}

impl Quantity {
    /// Variable / group name
    pub fn name(&self) -> &'static str {
        match self {
            Quantity::Sv => "Sv",
            Quantity::Sp => "Sp",
        }
    }

    /// Descriptive name stored as the `long_name` attribute
    pub fn long_name(&self) -> &'static str {
        match self {
            Quantity::Sv => "Volume backscattering strength (Sv re 1 m-1)",
            Quantity::Sp => "Point backscattering strength (Sp re 1 m2)",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Range in meters on the (channel, range_sample) grid
#[derive(Debug, Clone, PartialEq)]
pub struct RangeProfile {
    values: Array2<f64>,
}

impl RangeProfile {
    /// Wrap a (channel, range_sample) array
    pub fn new(values: Array2<f64>) -> Self {
        Self { values }
    }

    /// Underlying (channel, range_sample) values
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// (channels, range samples)
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Repeat the profile across `n_pings` pings, giving a
    /// (channel, ping_time, range_sample) array
    pub fn broadcast_pings(&self, n_pings: usize) -> Array3<f64> {
        let (n_channels, n_samples) = self.values.dim();
        Array3::from_shape_fn((n_channels, n_pings, n_samples), |(ch, _, s)| {
            self.values[[ch, s]]
        })
    }
}

/// What a cached range profile was computed from. A profile is reused only
/// while these match.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RangeInputs {
    pub(crate) sound_speed: Array1<f64>,
    pub(crate) tilt_corrected: bool,
}

/// Sv or Sp with its range and metadata attributes
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedResult {
    /// Which quantity `values` holds
    pub quantity: Quantity,
    /// Channel identifiers
    pub channel: Vec<String>,
    /// Ping timestamps
    pub ping_time: Vec<DateTime<Utc>>,
    /// Calibrated values in dB, (channel, ping_time, range_sample)
    pub values: Array3<f64>,
    /// Range in meters, (channel, ping_time, range_sample)
    pub range: Array3<f64>,
    /// Metadata attributes
    pub attrs: BTreeMap<String, String>,
}

impl CalibratedResult {
    /// Number of calibrated samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
