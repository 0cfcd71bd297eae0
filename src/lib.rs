//! # echocal - echosounder model dispatch and calibration
//!
//! `echocal` turns decoded echosounder records into calibrated acoustic
//! quantities. Every supported instrument model (`AZFP`, `AZFP6`, `EK60`,
//! `ES70`, `EK80`, `ES80`, `EA640`, `AD2CP`) has an entry in a static
//! registry that decides, per model:
//!
//! - which raw-file extensions and companion files are accepted
//! - how waveform / encode modes are validated
//! - how range in meters is corrected
//! - how large the backscatter payload is expected to be
//! - which metadata is stamped on calibrated results
//! - which groups are persisted
//!
//! Vendor decoding happens elsewhere; records enter through a
//! [`echodata::RecordSource`] (a JSON interchange file by default) and leave
//! through a [`store::GroupStore`] (a directory of Parquet files by default).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use echocal::prelude::*;
//!
//! let env = EnvironmentParameters::new()
//!     .with("speed_of_sound_in_water", 1500.0)
//!     .with("absorption", vec![0.0093, 0.0282]);
//! let cal: CalibrationParameters =
//!     toml::from_str(&std::fs::read_to_string("azfp_calibration.toml")?)?;
//!
//! let job = ConversionJob::from_key("AZFP", "17082117.01A")?
//!     .with_xml("17041823.XML")
//!     .with_parameters(env, cal)
//!     .with_save_options(SaveOptions::resolve(Engine::Netcdf4, true, &Default::default()));
//!
//! let source = JsonRecordSource::new("17082117.json");
//! let mut store = ParquetStore::create("17082117.echocal")?;
//! let output = Converter::new(job).run(&source, &mut store)?;
//!
//! let sv = output.record.calibrated(Quantity::Sv).expect("Sv was computed");
//! println!("{} -> {} samples", output.stats, sv.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The container then holds one Parquet file per group:
//! ```text
//! 17082117.echocal/
//! ├── Sonar/Beam_group1.parquet   # raw samples, one row per sample
//! └── Sv.parquet                  # Sv and range, one row per sample
//! ```
//!
//! ## Calibration Only
//!
//! The formulas are available without the pipeline:
//!
//! ```rust
//! use echocal::prelude::*;
//! use echocal::model::SonarModel;
//!
//! let env = EnvironmentParameters::new()
//!     .with("speed_of_sound_in_water", 1500.0)
//!     .with("absorption", 0.01);
//! let cal = CalibrationParameters::new();
//! let engine = CalibrationEngine::new(SonarModel::Azfp.descriptor(), &env, &cal);
//! # let _ = engine;
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
// Allow some patterns common in scientific code
#![allow(clippy::too_many_arguments)]

pub mod attrs;
pub mod calibrate;
pub mod convert;
pub mod echodata;
pub mod model;
pub mod modes;
pub mod range;
pub mod size;
pub mod store;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::calibrate::{
        CalibratedResult, CalibrationEngine, CalibrationError, CalibrationParameters,
        EnvironmentParameters, ParamValue, Quantity, RangeProfile,
    };
    pub use crate::convert::{ConversionJob, ConversionStats, ConvertError, Converter, Stage};
    pub use crate::echodata::{
        BeamGroup, ChannelSeries, EchoData, EchoDataError, InMemorySource, JsonRecordSource,
        RecordSource, VendorSpecific,
    };
    pub use crate::model::{lookup, RegistryError, SonarFamily, SonarModel, SonarModelDescriptor};
    pub use crate::modes::{EncodeMode, ModeError, ResolvedModes, WaveformMode};
    pub use crate::store::{
        CompressionSettings, Engine, GroupStore, MemoryStore, ParquetStore, SaveOptions,
    };
    pub use crate::validator::{check_job, ValidationReport};
}
