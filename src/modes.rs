//! Transmit waveform and sample encoding mode validation.
//!
//! Narrowband-only instruments coerce any other request to `CW`/`power` with a
//! warning, while broadband-capable instruments require both modes and reject
//! combinations the hardware cannot record. The asymmetry is intentional.

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::SonarModel;

/// Transmit pulse type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveformMode {
    /// Continuous wave (narrowband)
    #[serde(rename = "CW")]
    Cw,
    /// Broadband (frequency modulated)
    #[serde(rename = "BB")]
    Bb,
}

impl WaveformMode {
    /// String form used in files and attributes
    pub fn as_str(&self) -> &'static str {
        match self {
            WaveformMode::Cw => "CW",
            WaveformMode::Bb => "BB",
        }
    }
}

impl fmt::Display for WaveformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaveformMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CW" => Ok(WaveformMode::Cw),
            "BB" => Ok(WaveformMode::Bb),
            other => Err(ModeError::InvalidMode {
                field: "waveform_mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Sample representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeMode {
    /// Magnitude only (power / power+angle samples)
    Power,
    /// Complex samples
    Complex,
}

impl EncodeMode {
    /// String form used in files and attributes
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeMode::Power => "power",
            EncodeMode::Complex => "complex",
        }
    }
}

impl fmt::Display for EncodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodeMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power" => Ok(EncodeMode::Power),
            "complex" => Ok(EncodeMode::Complex),
            other => Err(ModeError::InvalidMode {
                field: "encode_mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Errors raised by mode validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    /// A mode the model requires was not supplied
    #[error("The {field} must be specified for {model} calibration")]
    MissingMode {
        /// `"waveform_mode"` or `"encode_mode"`
        field: &'static str,
        /// Model key
        model: String,
    },

    /// The instrument cannot record this combination
    #[error("encode_mode='{encode}' is not allowed when waveform_mode='{waveform}': {reason}")]
    IncompatibleModeCombination {
        /// Requested waveform mode
        waveform: WaveformMode,
        /// Requested encode mode
        encode: EncodeMode,
        /// Why the combination is rejected
        reason: String,
    },

    /// Mode string is not recognised
    #[error("Invalid {field} '{value}'")]
    InvalidMode {
        /// Field name
        field: &'static str,
        /// Value received
        value: String,
    },
}

/// Non-fatal coercion applied by a narrowband-only model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeWarning {
    /// A non-CW waveform was requested and replaced by CW
    NarrowbandOnly {
        /// Waveform that was requested
        requested: WaveformMode,
    },
    /// A non-power encoding was requested and replaced by power
    PowerOnly {
        /// Encoding that was requested
        requested: EncodeMode,
    },
}

impl fmt::Display for ModeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeWarning::NarrowbandOnly { .. } => write!(
                f,
                "This sonar model transmits only narrowband signals (waveform_mode='CW'). \
                 Calibration will be in CW mode"
            ),
            ModeWarning::PowerOnly { .. } => write!(
                f,
                "This sonar model only record data as power or power/angle samples \
                 (encode_mode='power'). Calibration will be done on the power samples."
            ),
        }
    }
}

/// Modes to use for the rest of a conversion, after validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedModes {
    /// Effective waveform mode
    pub waveform_mode: Option<WaveformMode>,
    /// Effective encode mode
    pub encode_mode: Option<EncodeMode>,
    /// Coercions that were applied
    pub warnings: Vec<ModeWarning>,
}

/// Checks whether an instrument can record a waveform/encode combination
pub trait ModeCompatibility {
    /// Return an error when the combination is physically impossible
    fn check(&self, waveform: WaveformMode, encode: EncodeMode) -> Result<(), ModeError>;
}

/// Combination rules of Simrad broadband transceivers
#[derive(Debug, Clone, Copy, Default)]
pub struct SimradCompatibility;

impl ModeCompatibility for SimradCompatibility {
    fn check(&self, waveform: WaveformMode, encode: EncodeMode) -> Result<(), ModeError> {
        match (waveform, encode) {
            (WaveformMode::Bb, EncodeMode::Power) => Err(ModeError::IncompatibleModeCombination {
                waveform,
                encode,
                reason: "broadband transmissions are only recorded as complex samples".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Per-model mode validation behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCheck {
    /// Warn and coerce to `CW`/`power`
    NarrowbandOnly,
    /// Both modes mandatory, combination checked
    Broadband,
    /// No mode concept; requests pass through untouched
    NoOp,
}

impl ModeCheck {
    /// Validate using the Simrad combination rules
    pub fn resolve(
        &self,
        model: SonarModel,
        waveform_mode: Option<WaveformMode>,
        encode_mode: Option<EncodeMode>,
    ) -> Result<ResolvedModes, ModeError> {
        self.resolve_with(model, waveform_mode, encode_mode, &SimradCompatibility)
    }

    /// Validate using a caller-supplied combination check
    pub fn resolve_with(
        &self,
        model: SonarModel,
        waveform_mode: Option<WaveformMode>,
        encode_mode: Option<EncodeMode>,
        compatibility: &dyn ModeCompatibility,
    ) -> Result<ResolvedModes, ModeError> {
        match self {
            ModeCheck::NarrowbandOnly => {
                let mut warnings = Vec::new();
                if let Some(requested) = waveform_mode.filter(|w| *w != WaveformMode::Cw) {
                    warnings.push(ModeWarning::NarrowbandOnly { requested });
                }
                if let Some(requested) = encode_mode.filter(|e| *e != EncodeMode::Power) {
                    warnings.push(ModeWarning::PowerOnly { requested });
                }
                for w in &warnings {
                    warn!("{}: {}", model, w);
                }
                Ok(ResolvedModes {
                    waveform_mode: Some(WaveformMode::Cw),
                    encode_mode: Some(EncodeMode::Power),
                    warnings,
                })
            }
            ModeCheck::Broadband => {
                let waveform = waveform_mode.ok_or_else(|| ModeError::MissingMode {
                    field: "waveform_mode",
                    model: model.to_string(),
                })?;
                let encode = encode_mode.ok_or_else(|| ModeError::MissingMode {
                    field: "encode_mode",
                    model: model.to_string(),
                })?;
                compatibility.check(waveform, encode)?;
                Ok(ResolvedModes {
                    waveform_mode: Some(waveform),
                    encode_mode: Some(encode),
                    warnings: Vec::new(),
                })
            }
            ModeCheck::NoOp => Ok(ResolvedModes {
                waveform_mode,
                encode_mode,
                warnings: Vec::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recording {
        calls: RefCell<Vec<(WaveformMode, EncodeMode)>>,
    }

    impl ModeCompatibility for Recording {
        fn check(&self, waveform: WaveformMode, encode: EncodeMode) -> Result<(), ModeError> {
            self.calls.borrow_mut().push((waveform, encode));
            Ok(())
        }
    }

    #[test]
    fn test_broadband_requires_waveform_first() {
        let err = ModeCheck::Broadband
            .resolve(SonarModel::Ek80, None, Some(EncodeMode::Power))
            .unwrap_err();
        assert!(matches!(err, ModeError::MissingMode { field: "waveform_mode", .. }));

        // waveform is reported even when both are missing
        let err = ModeCheck::Broadband
            .resolve(SonarModel::Ek80, None, None)
            .unwrap_err();
        assert!(matches!(err, ModeError::MissingMode { field: "waveform_mode", .. }));
    }

    #[test]
    fn test_broadband_requires_encode() {
        let err = ModeCheck::Broadband
            .resolve(SonarModel::Ek80, Some(WaveformMode::Cw), None)
            .unwrap_err();
        assert_eq!(
            err,
            ModeError::MissingMode {
                field: "encode_mode",
                model: "EK80".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "The encode_mode must be specified for EK80 calibration"
        );
    }

    #[test]
    fn test_broadband_delegates_combination_check() {
        let recording = Recording::default();
        let resolved = ModeCheck::Broadband
            .resolve_with(
                SonarModel::Ek80,
                Some(WaveformMode::Bb),
                Some(EncodeMode::Power),
                &recording,
            )
            .unwrap();
        assert_eq!(
            *recording.calls.borrow(),
            vec![(WaveformMode::Bb, EncodeMode::Power)]
        );
        assert_eq!(resolved.waveform_mode, Some(WaveformMode::Bb));
        assert_eq!(resolved.encode_mode, Some(EncodeMode::Power));
    }

    #[test]
    fn test_simrad_rejects_broadband_power() {
        let err = ModeCheck::Broadband
            .resolve(SonarModel::Ek80, Some(WaveformMode::Bb), Some(EncodeMode::Power))
            .unwrap_err();
        assert!(matches!(err, ModeError::IncompatibleModeCombination { .. }));

        for (w, e) in [
            (WaveformMode::Bb, EncodeMode::Complex),
            (WaveformMode::Cw, EncodeMode::Complex),
            (WaveformMode::Cw, EncodeMode::Power),
        ] {
            assert!(ModeCheck::Broadband.resolve(SonarModel::Ek80, Some(w), Some(e)).is_ok());
        }
    }

    #[test]
    fn test_narrowband_coerces_with_warnings() {
        let resolved = ModeCheck::NarrowbandOnly
            .resolve(SonarModel::Ek60, Some(WaveformMode::Bb), Some(EncodeMode::Complex))
            .unwrap();
        assert_eq!(resolved.waveform_mode, Some(WaveformMode::Cw));
        assert_eq!(resolved.encode_mode, Some(EncodeMode::Power));
        assert_eq!(
            resolved.warnings,
            vec![
                ModeWarning::NarrowbandOnly {
                    requested: WaveformMode::Bb
                },
                ModeWarning::PowerOnly {
                    requested: EncodeMode::Complex
                },
            ]
        );
    }

    #[test]
    fn test_narrowband_silent_for_default_modes() {
        let resolved = ModeCheck::NarrowbandOnly
            .resolve(SonarModel::Azfp, None, Some(EncodeMode::Power))
            .unwrap();
        assert!(resolved.warnings.is_empty());
        assert_eq!(resolved.waveform_mode, Some(WaveformMode::Cw));
    }

    #[test]
    fn test_noop_passes_through() {
        let resolved = ModeCheck::NoOp
            .resolve(SonarModel::Ad2cp, Some(WaveformMode::Bb), None)
            .unwrap();
        assert_eq!(resolved.waveform_mode, Some(WaveformMode::Bb));
        assert_eq!(resolved.encode_mode, None);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("CW".parse::<WaveformMode>().unwrap(), WaveformMode::Cw);
        assert_eq!("complex".parse::<EncodeMode>().unwrap(), EncodeMode::Complex);
        assert!(matches!(
            "cw".parse::<WaveformMode>(),
            Err(ModeError::InvalidMode { field: "waveform_mode", .. })
        ));
        assert!("POWER".parse::<EncodeMode>().is_err());
    }
}
