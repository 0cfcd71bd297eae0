use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::model::SonarModelDescriptor;

use super::error::EchoDataError;
use super::types::EchoData;

/// Supplies parsed records to a conversion.
///
/// Vendor decoders live outside this crate; a `RecordSource` is the seam
/// where their output enters.
pub trait RecordSource {
    /// Produce the record for `descriptor`'s model
    fn load(&self, descriptor: &SonarModelDescriptor) -> Result<EchoData, EchoDataError>;
}

/// Reads a JSON interchange record written by an external decoder
#[derive(Debug, Clone)]
pub struct JsonRecordSource {
    path: PathBuf,
}

impl JsonRecordSource {
    /// Source backed by the JSON file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the interchange file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonRecordSource {
    fn load(&self, descriptor: &SonarModelDescriptor) -> Result<EchoData, EchoDataError> {
        info!("Reading interchange record {}", self.path.display());
        // The file handle is dropped at the end of this scope on every path
        let record: EchoData = {
            let reader = BufReader::new(File::open(&self.path)?);
            serde_json::from_reader(reader)?
        };
        check_record(descriptor, record)
    }
}

/// Hands out clones of a record already in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    record: EchoData,
}

impl InMemorySource {
    /// Wrap an existing record
    pub fn new(record: EchoData) -> Self {
        Self { record }
    }
}

impl RecordSource for InMemorySource {
    fn load(&self, descriptor: &SonarModelDescriptor) -> Result<EchoData, EchoDataError> {
        check_record(descriptor, self.record.clone())
    }
}

fn check_record(
    descriptor: &SonarModelDescriptor,
    record: EchoData,
) -> Result<EchoData, EchoDataError> {
    if record.sonar_model.descriptor().parser != descriptor.parser {
        return Err(EchoDataError::ModelMismatch {
            expected: descriptor.model.to_string(),
            found: record.sonar_model.to_string(),
        });
    }
    record.validate()?;
    debug!(
        "Record for {} has {} beam group(s)",
        record.sonar_model,
        record.beam_groups.len()
    );
    Ok(record)
}
