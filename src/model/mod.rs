//! # Sonar Model Registry
//!
//! Every supported instrument model is a variant of [`SonarModel`]. The
//! per-model differences (file extension, auxiliary files, range correction,
//! mode checks, payload sizing, attribute stamping and the save procedure)
//! live in a static table of [`SonarModelDescriptor`]s, one per model.
//!
//! Each capability slot of a descriptor is a small tagged enum with an
//! explicit no-op variant, so a model that lacks a capability still carries
//! the slot. Callers never branch on whether a model "supports" an operation.
//!
//! ```
//! use echocal::model::{lookup, SonarModel};
//!
//! let descriptor = lookup("EK80").unwrap();
//! assert_eq!(descriptor.model, SonarModel::Ek80);
//! assert!(descriptor.accepts_bot);
//! descriptor.validate_extension(".RAW").unwrap();
//! ```

mod error;
mod extension;
mod registry;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::RegistryError;
pub use extension::ExtensionRule;
pub use registry::{lookup, GroupBuilderKind, ParserKind, RangeSource, SonarModelDescriptor};

/// Instrument model keys understood by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SonarModel {
    /// ASL Environmental Sciences AZFP (`.01A` style files plus XML)
    #[serde(rename = "AZFP")]
    Azfp,
    /// ASL Environmental Sciences AZFP, ULS6 generation (`.azfp` files)
    #[serde(rename = "AZFP6")]
    Azfp6,
    /// Simrad EK60
    #[serde(rename = "EK60")]
    Ek60,
    /// Simrad ES70
    #[serde(rename = "ES70")]
    Es70,
    /// Simrad EK80
    #[serde(rename = "EK80")]
    Ek80,
    /// Simrad ES80
    #[serde(rename = "ES80")]
    Es80,
    /// Kongsberg EA640
    #[serde(rename = "EA640")]
    Ea640,
    /// Nortek Signature AD2CP
    #[serde(rename = "AD2CP")]
    Ad2cp,
}

impl SonarModel {
    /// All models, in registry order
    pub const ALL: [SonarModel; 8] = [
        SonarModel::Azfp,
        SonarModel::Azfp6,
        SonarModel::Ek60,
        SonarModel::Es70,
        SonarModel::Ek80,
        SonarModel::Es80,
        SonarModel::Ea640,
        SonarModel::Ad2cp,
    ];

    /// Canonical model key, e.g. `"EK80"`
    pub fn key(&self) -> &'static str {
        match self {
            SonarModel::Azfp => "AZFP",
            SonarModel::Azfp6 => "AZFP6",
            SonarModel::Ek60 => "EK60",
            SonarModel::Es70 => "ES70",
            SonarModel::Ek80 => "EK80",
            SonarModel::Es80 => "ES80",
            SonarModel::Ea640 => "EA640",
            SonarModel::Ad2cp => "AD2CP",
        }
    }

    /// Hardware family of this model
    pub fn family(&self) -> SonarFamily {
        match self {
            SonarModel::Azfp | SonarModel::Azfp6 => SonarFamily::LegacyNarrowband,
            SonarModel::Ek60 | SonarModel::Es70 => SonarFamily::ClassicCw,
            SonarModel::Ek80 | SonarModel::Es80 | SonarModel::Ea640 => SonarFamily::Broadband,
            SonarModel::Ad2cp => SonarFamily::Doppler,
        }
    }

    /// Registry entry for this model. Never fails.
    pub fn descriptor(&self) -> &'static SonarModelDescriptor {
        registry::descriptor_for(*self)
    }
}

impl fmt::Display for SonarModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SonarModel {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SonarModel::ALL
            .iter()
            .copied()
            .find(|m| m.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::UnknownModel(s.to_string()))
    }
}

/// Instrument families sharing hardware constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SonarFamily {
    /// Single-frequency-per-channel AZFP instruments
    LegacyNarrowband,
    /// Continuous-wave Simrad echosounders (EK60/ES70)
    ClassicCw,
    /// Broadband-capable Simrad/Kongsberg echosounders (EK80/ES80/EA640)
    Broadband,
    /// Acoustic Doppler current profilers
    Doppler,
}

impl fmt::Display for SonarFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SonarFamily::LegacyNarrowband => "legacy narrowband",
            SonarFamily::ClassicCw => "classic CW",
            SonarFamily::Broadband => "broadband",
            SonarFamily::Doppler => "doppler",
        };
        f.write_str(name)
    }
}
