use std::path::{Path, PathBuf};

use crate::calibrate::{CalibrationParameters, EnvironmentParameters, Quantity};
use crate::model::{RegistryError, SonarModel, SonarModelDescriptor};
use crate::modes::{EncodeMode, WaveformMode};
use crate::store::SaveOptions;

/// Everything needed to convert one raw file
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Instrument model
    pub model: SonarModel,
    /// Raw data file
    pub raw_file: PathBuf,
    /// XML configuration file (AZFP)
    pub xml_file: Option<PathBuf>,
    /// Bottom-detection file
    pub bot_file: Option<PathBuf>,
    /// Index file
    pub idx_file: Option<PathBuf>,
    /// Requested waveform mode
    pub waveform_mode: Option<WaveformMode>,
    /// Requested encode mode
    pub encode_mode: Option<EncodeMode>,
    /// Quantity to calibrate to
    pub quantity: Quantity,
    /// Scale the legacy range by the mean tilt cosine
    pub tilt_corrected: bool,
    /// Water properties
    pub environment: EnvironmentParameters,
    /// Instrument constants
    pub calibration: CalibrationParameters,
    /// Engine and compression of the output
    pub save: SaveOptions,
}

impl ConversionJob {
    /// Job converting `raw_file` to Sv with default options
    pub fn new(model: SonarModel, raw_file: impl AsRef<Path>) -> Self {
        Self {
            model,
            raw_file: raw_file.as_ref().to_path_buf(),
            xml_file: None,
            bot_file: None,
            idx_file: None,
            waveform_mode: None,
            encode_mode: None,
            quantity: Quantity::Sv,
            tilt_corrected: false,
            environment: EnvironmentParameters::default(),
            calibration: CalibrationParameters::default(),
            save: SaveOptions::new(Default::default()),
        }
    }

    /// Like [`ConversionJob::new`], parsing the model key
    pub fn from_key(model_key: &str, raw_file: impl AsRef<Path>) -> Result<Self, RegistryError> {
        Ok(Self::new(model_key.parse()?, raw_file))
    }

    /// Registry entry of the job's model
    pub fn descriptor(&self) -> &'static SonarModelDescriptor {
        self.model.descriptor()
    }

    /// Set the XML configuration file
    pub fn with_xml(mut self, path: impl AsRef<Path>) -> Self {
        self.xml_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the bottom-detection file
    pub fn with_bot(mut self, path: impl AsRef<Path>) -> Self {
        self.bot_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the index file
    pub fn with_idx(mut self, path: impl AsRef<Path>) -> Self {
        self.idx_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the requested modes
    pub fn with_modes(
        mut self,
        waveform_mode: Option<WaveformMode>,
        encode_mode: Option<EncodeMode>,
    ) -> Self {
        self.waveform_mode = waveform_mode;
        self.encode_mode = encode_mode;
        self
    }

    /// Set the quantity to compute
    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the environment and calibration constants
    pub fn with_parameters(
        mut self,
        environment: EnvironmentParameters,
        calibration: CalibrationParameters,
    ) -> Self {
        self.environment = environment;
        self.calibration = calibration;
        self
    }

    /// Enable or disable tilt correction
    pub fn with_tilt_correction(mut self, tilt_corrected: bool) -> Self {
        self.tilt_corrected = tilt_corrected;
        self
    }

    /// Set engine and compression
    pub fn with_save_options(mut self, save: SaveOptions) -> Self {
        self.save = save;
        self
    }
}
