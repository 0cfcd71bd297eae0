//! Named calibration and environment constants.

use std::collections::BTreeMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::CalibrationError;

/// Electronic gain key
pub const EL: &str = "EL";
/// Detector slope key
pub const DS: &str = "DS";
/// Transmit voltage response key
pub const TVR: &str = "TVR";
/// Receive voltage key
pub const VTX: &str = "VTX";
/// Frequency-dependent Sv offset key
pub const SV_OFFSET: &str = "Sv_offset";
/// Equivalent two-way beam angle key
pub const EQUIVALENT_BEAM_ANGLE: &str = "equivalent_beam_angle";
/// Sound speed key
pub const SPEED_OF_SOUND: &str = "speed_of_sound_in_water";
/// Absorption coefficient key
pub const ABSORPTION: &str = "absorption";

/// Keys every calibration parameter set must provide
pub const CALIBRATION_KEYS: [&str; 6] = [EL, DS, TVR, VTX, SV_OFFSET, EQUIVALENT_BEAM_ANGLE];

/// Keys every environment parameter set must provide
pub const ENVIRONMENT_KEYS: [&str; 2] = [SPEED_OF_SOUND, ABSORPTION];

/// A parameter given once for all channels or once per channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Same value on every channel
    Scalar(f64),
    /// One value per channel
    PerChannel(Vec<f64>),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::PerChannel(v)
    }
}

fn per_channel(
    set: &'static str,
    values: &BTreeMap<String, ParamValue>,
    key: &'static str,
    n_channels: usize,
) -> Result<Array1<f64>, CalibrationError> {
    match values.get(key) {
        None => Err(CalibrationError::MissingParameter { set, key }),
        Some(ParamValue::Scalar(v)) => Ok(Array1::from_elem(n_channels, *v)),
        Some(ParamValue::PerChannel(v)) if v.len() == n_channels => Ok(Array1::from(v.clone())),
        Some(ParamValue::PerChannel(v)) => Err(CalibrationError::ChannelCountMismatch {
            key,
            expected: n_channels,
            actual: v.len(),
        }),
    }
}

macro_rules! parameter_set {
    ($(#[$meta:meta])* $name:ident, $set:literal, $keys:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(BTreeMap<String, ParamValue>);

        impl $name {
            /// Empty parameter set
            pub fn new() -> Self {
                Self::default()
            }

            /// Builder-style insert
            pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
                self.0.insert(key.into(), value.into());
                self
            }

            /// Insert or replace a value
            pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
                self.0.insert(key.into(), value.into());
            }

            /// Raw value for a key
            pub fn get(&self, key: &str) -> Option<&ParamValue> {
                self.0.get(key)
            }

            /// Value of `key` expanded to one entry per channel
            pub fn per_channel(&self, key: &'static str, n_channels: usize) -> Result<Array1<f64>, CalibrationError> {
                per_channel($set, &self.0, key, n_channels)
            }

            /// Required keys that are absent
            pub fn missing_keys(&self) -> Vec<&'static str> {
                $keys.into_iter().filter(|k| !self.0.contains_key(*k)).collect()
            }
        }
    };
}

parameter_set!(
    /// Instrument calibration constants (`EL`, `DS`, `TVR`, `VTX`,
    /// `Sv_offset`, `equivalent_beam_angle`)
    CalibrationParameters,
    "calibration",
    CALIBRATION_KEYS
);

parameter_set!(
    /// Water properties (`speed_of_sound_in_water`, `absorption`)
    EnvironmentParameters,
    "environment",
    ENVIRONMENT_KEYS
);
