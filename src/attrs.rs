//! Model-specific metadata stamped on calibrated results.

use crate::calibrate::CalibratedResult;
use crate::modes::ResolvedModes;

/// Attribute key for the waveform mode
pub const WAVEFORM_MODE_ATTR: &str = "waveform_mode";
/// Attribute key for the encode mode
pub const ENCODE_MODE_ATTR: &str = "encode_mode";

/// Per-model annotation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrsRule {
    /// Leave the result untouched
    NoOp,
    /// Record the effective waveform and encode modes
    StampModes,
}

impl AttrsRule {
    /// Stamp `result` according to the rule. Modes left unset are not
    /// written.
    pub fn annotate(&self, result: &mut CalibratedResult, modes: &ResolvedModes) {
        match self {
            AttrsRule::NoOp => {}
            AttrsRule::StampModes => {
                if let Some(waveform) = modes.waveform_mode {
                    result
                        .attrs
                        .insert(WAVEFORM_MODE_ATTR.to_string(), waveform.to_string());
                }
                if let Some(encode) = modes.encode_mode {
                    result
                        .attrs
                        .insert(ENCODE_MODE_ATTR.to_string(), encode.to_string());
                }
            }
        }
    }
}
