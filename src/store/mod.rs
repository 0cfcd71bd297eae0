//! # Group persistence
//!
//! Converted records are persisted group by group: the beam groups a model
//! saves, followed by any calibrated quantity under its own group (`Sv`,
//! `Sp`). Where the groups go is abstracted by [`GroupStore`]:
//!
//! - [`MemoryStore`] records what would be written, for dry runs and tests
//! - [`ParquetStore`] writes one Parquet file per group inside a container
//!   directory, as a long table with one row per sample
//!
//! ```rust,no_run
//! use echocal::store::{Engine, ParquetStore, SaveOptions};
//!
//! let store = ParquetStore::create("survey.echocal")?;
//! let options = SaveOptions::resolve(Engine::Zarr, true, &Default::default());
//! println!("{} with {:?}", store.root().display(), options.compression);
//! # Ok::<(), echocal::store::StoreError>(())
//! ```

use std::collections::BTreeMap;

use crate::calibrate::CalibratedResult;
use crate::echodata::BeamGroup;

mod config;
mod dispatch;
mod error;
mod memory;
mod parquet_store;


pub use config::{Codec, CompressionSettings, Engine, SaveOptions};
pub use dispatch::SaveRule;
pub use error::StoreError;
pub use memory::{MemoryStore, SavedGroup};
pub use parquet_store::{
    ParquetStore, BACKSCATTER_I, BACKSCATTER_R, CHANNEL, KEY_COMPRESSION, KEY_ENGINE, KEY_GROUP,
    PING_TIME, RANGE, RANGE_SAMPLE,
};

/// Contents of one group
#[derive(Debug, Clone, Copy)]
pub enum GroupPayload<'a> {
    /// Raw samples of a beam group
    Beam(&'a BeamGroup),
    /// A calibrated quantity with its range
    Calibrated(&'a CalibratedResult),
}

impl GroupPayload<'_> {
    /// Number of samples, i.e. rows in a long table
    pub fn sample_count(&self) -> usize {
        match self {
            GroupPayload::Beam(beam) => beam.backscatter_r.len(),
            GroupPayload::Calibrated(result) => result.len(),
        }
    }

    /// Group-level attributes
    pub fn attrs(&self) -> BTreeMap<String, String> {
        match self {
            GroupPayload::Beam(_) => BTreeMap::new(),
            GroupPayload::Calibrated(result) => result.attrs.clone(),
        }
    }
}

/// Destination for persisted groups.
///
/// Implementations open the container in append mode: a group that does not
/// exist yet is created, other groups are left alone.
pub trait GroupStore {
    /// Write `payload` as `group`
    fn write_group(
        &mut self,
        group: &str,
        payload: GroupPayload<'_>,
        options: &SaveOptions,
    ) -> Result<(), StoreError>;
}
