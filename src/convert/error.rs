use std::fmt;
use std::path::PathBuf;

use crate::calibrate::CalibrationError;
use crate::echodata::EchoDataError;
use crate::model::{RegistryError, SonarModel};
use crate::modes::ModeError;
use crate::size::SizeError;
use crate::store::StoreError;

/// Step of a conversion, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Raw file extension check
    Extension,
    /// XML / `.bot` / `.idx` companion files
    AuxiliaryFiles,
    /// Reading the parsed record
    Load,
    /// Waveform / encode mode validation
    Modes,
    /// Backscatter payload sizing
    Size,
    /// Range in meters
    Range,
    /// Sv / Sp computation
    Calibration,
    /// Metadata stamping
    Annotation,
    /// Persisting groups
    Save,
}

impl Stage {
    /// Every stage, in execution order
    pub const ALL: [Stage; 9] = [
        Stage::Extension,
        Stage::AuxiliaryFiles,
        Stage::Load,
        Stage::Modes,
        Stage::Size,
        Stage::Range,
        Stage::Calibration,
        Stage::Annotation,
        Stage::Save,
    ];

    /// Human-readable stage name
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Extension => "extension check",
            Stage::AuxiliaryFiles => "auxiliary file check",
            Stage::Load => "record loading",
            Stage::Modes => "mode validation",
            Stage::Size => "backscatter sizing",
            Stage::Range => "range computation",
            Stage::Calibration => "calibration",
            Stage::Annotation => "annotation",
            Stage::Save => "save",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Underlying failure of a stage
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Unknown model, bad extension or companion files
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Record could not be read or is malformed
    #[error(transparent)]
    EchoData(#[from] EchoDataError),

    /// Missing or incompatible modes
    #[error(transparent)]
    Mode(#[from] ModeError),

    /// Payload sizing failed
    #[error(transparent)]
    Size(#[from] SizeError),

    /// Range or calibration failed
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Groups could not be written
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A failed conversion, naming model, file and stage
#[derive(Debug, thiserror::Error)]
#[error("{model} conversion of '{}' failed during {stage}: {source}", .path.display())]
pub struct ConvertError {
    /// Model being converted
    pub model: SonarModel,
    /// Raw file being converted
    pub path: PathBuf,
    /// Stage that failed
    pub stage: Stage,
    /// What went wrong
    #[source]
    pub source: StageError,
}
