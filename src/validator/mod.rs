//! # Job checks
//!
//! A dry run of a conversion job. The stages that do not need numbers
//! (extension, companion files, modes, parameter completeness, and with a
//! record at hand the record itself and its payload size) are run one after
//! the other, and each outcome lands in a [`ValidationReport`] as OK, WARNING
//! or FAILED instead of aborting the run.
//!
//! ```rust,no_run
//! use echocal::convert::ConversionJob;
//! use echocal::validator::check_job;
//!
//! let job = ConversionJob::from_key("EK80", "D20210101-T000000.raw")?;
//! let report = check_job(&job, None);
//! println!("{}", report);
//! # Ok::<(), echocal::model::RegistryError>(())
//! ```

mod checks;
mod report;

pub use checks::check_job;
pub use report::{CheckStatus, ValidationCheck, ValidationReport};
