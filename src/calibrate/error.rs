use crate::echodata::EchoDataError;
use crate::range::RangeError;

/// Errors that can occur during calibration
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    /// A required calibration or environment key is absent
    #[error("Missing {set} parameter '{key}'")]
    MissingParameter {
        /// `"calibration"` or `"environment"`
        set: &'static str,
        /// Key that was looked up
        key: &'static str,
    },

    /// Per-channel sequence has the wrong length
    #[error("Parameter '{key}' has {actual} values but the beam group has {expected} channels")]
    ChannelCountMismatch {
        /// Parameter key
        key: &'static str,
        /// Channels in the beam group
        expected: usize,
        /// Values supplied
        actual: usize,
    },

    /// Range profile does not match the samples being calibrated
    #[error("Range profile shape {actual:?} does not match (channel, range_sample) = {expected:?}")]
    RangeShapeMismatch {
        /// (channels, range samples) of the beam group
        expected: (usize, usize),
        /// Shape of the range profile
        actual: (usize, usize),
    },

    /// Record is missing data the formulas need
    #[error(transparent)]
    EchoData(#[from] EchoDataError),

    /// Range correction failed
    #[error(transparent)]
    Range(#[from] RangeError),
}
