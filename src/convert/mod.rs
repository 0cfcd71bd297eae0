//! # Conversion pipeline
//!
//! A [`ConversionJob`] names a model, a raw file with its companion files,
//! the requested modes and the calibration constants. [`Converter::run`]
//! drives it through every stage, delegating each step to the model's
//! registry entry, and reports the first failure as a [`ConvertError`]
//! carrying model, file and [`Stage`].
//!
//! ```rust,no_run
//! use echocal::convert::{ConversionJob, Converter};
//! use echocal::echodata::JsonRecordSource;
//! use echocal::store::MemoryStore;
//!
//! let job = ConversionJob::from_key("AZFP", "17082117.01A")?.with_xml("17041823.XML");
//! let source = JsonRecordSource::new("17082117.json");
//! let mut store = MemoryStore::new();
//! let output = Converter::new(job).run(&source, &mut store)?;
//! println!("{}", output.stats);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod job;
mod pipeline;
mod stats;


pub use error::{ConvertError, Stage, StageError};
pub use job::ConversionJob;
pub use pipeline::{ConversionOutput, Converter};
pub use stats::ConversionStats;
