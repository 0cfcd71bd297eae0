//! TOML job configuration.
//!
//! Calibration constants rarely change between files, so they live in a
//! config file rather than on the command line:
//!
//! ```toml
//! # azfp.toml
//! [conversion]
//! sonar_model = "AZFP"
//! engine = "zarr"
//! compress = true
//! tilt_corrected = false
//!
//! [environment]
//! speed_of_sound_in_water = 1500.0
//! absorption = [0.0093, 0.0282]
//!
//! [calibration]
//! EL = [153.4, 146.7]
//! DS = 0.026
//! TVR = [169.4, 164.4]
//! VTX = [151.0, 127.0]
//! Sv_offset = [1.1, 1.1]
//! equivalent_beam_angle = [0.0251, 0.0219]
//!
//! [compression.zarr]
//! codec = "zstd"
//! level = 5
//! ```
//!
//! Command-line flags take precedence over the file.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use echocal::calibrate::{CalibrationParameters, EnvironmentParameters};
use echocal::modes::{EncodeMode, WaveformMode};
use echocal::store::{CompressionSettings, Engine};

/// Root of an echocal TOML file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Job settings
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Water properties
    #[serde(default)]
    pub environment: EnvironmentParameters,

    /// Instrument constants
    #[serde(default)]
    pub calibration: CalibrationParameters,

    /// Compression settings keyed by engine name
    #[serde(default)]
    pub compression: BTreeMap<String, CompressionSettings>,
}

/// The `[conversion]` table
#[derive(Debug, Default, Deserialize)]
pub struct ConversionConfig {
    /// Model key
    pub sonar_model: Option<String>,

    /// Output engine
    pub engine: Option<Engine>,

    /// Compress output groups
    pub compress: Option<bool>,

    /// Requested waveform mode
    pub waveform_mode: Option<WaveformMode>,

    /// Requested encode mode
    pub encode_mode: Option<EncodeMode>,

    /// Apply tilt correction to the legacy range
    pub tilt_corrected: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` when given, otherwise start from defaults
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echocal::calibrate::params::{ABSORPTION, EL};
    use echocal::calibrate::ParamValue;
    use echocal::store::Codec;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [conversion]
            sonar_model = "EK80"
            engine = "netcdf4"
            compress = false
            waveform_mode = "BB"
            encode_mode = "complex"

            [environment]
            speed_of_sound_in_water = 1480
            absorption = [0.01, 0.02]

            [calibration]
            EL = 170.0

            [compression.netcdf4]
            codec = "snappy"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.conversion.sonar_model.as_deref(), Some("EK80"));
        assert_eq!(config.conversion.engine, Some(Engine::Netcdf4));
        assert_eq!(config.conversion.compress, Some(false));
        assert_eq!(config.conversion.waveform_mode, Some(WaveformMode::Bb));
        assert_eq!(config.conversion.encode_mode, Some(EncodeMode::Complex));
        assert_eq!(
            config.environment.get(ABSORPTION),
            Some(&ParamValue::PerChannel(vec![0.01, 0.02]))
        );
        assert_eq!(config.calibration.get(EL), Some(&ParamValue::Scalar(170.0)));
        assert_eq!(config.compression["netcdf4"].codec, Codec::Snappy);
    }

    #[test]
    fn test_bad_mode_is_rejected() {
        let toml = r#"
            [conversion]
            waveform_mode = "cw"
        "#;
        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert!(config.conversion.sonar_model.is_none());
        assert!(config.compression.is_empty());
        assert!(Config::load_optional(None).unwrap().calibration.missing_keys().len() == 6);
    }
}
