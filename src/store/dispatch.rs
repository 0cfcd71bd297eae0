use std::fmt;

use log::info;

use crate::calibrate::Quantity;
use crate::echodata::{EchoData, EchoDataError};

use super::{GroupPayload, GroupStore, SaveOptions, StoreError};

/// Which beam groups a model persists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRule {
    /// `Beam_group1`, plus `Beam_group2` when the record has one
    PrimaryAndSecondary,
    /// Every beam group, in order
    EveryBeamGroup,
}

impl SaveRule {
    /// Zero-based indices of the beam groups to persist
    pub fn beam_indices(&self, record: &EchoData) -> Result<Vec<usize>, EchoDataError> {
        let n = record.beam_groups.len();
        if n == 0 {
            return Err(EchoDataError::NoBeamGroups);
        }
        Ok(match self {
            SaveRule::PrimaryAndSecondary => (0..n.min(2)).collect(),
            SaveRule::EveryBeamGroup => (0..n).collect(),
        })
    }

    /// Persist the record's beam groups followed by every calibrated
    /// quantity attached to it. Returns the written group names in order.
    pub fn save(
        &self,
        record: &EchoData,
        store: &mut dyn GroupStore,
        options: &SaveOptions,
    ) -> Result<Vec<String>, StoreError> {
        let mut written = Vec::new();

        for index in self.beam_indices(record)? {
            let name = EchoData::beam_group_name(index);
            store.write_group(&name, GroupPayload::Beam(record.beam_group(index)?), options)?;
            written.push(name);
        }

        for quantity in [Quantity::Sv, Quantity::Sp] {
            if let Some(result) = record.calibrated(quantity) {
                store.write_group(quantity.name(), GroupPayload::Calibrated(result), options)?;
                written.push(quantity.name().to_string());
            }
        }

        info!(
            "Saved {} groups of {} record (engine={})",
            written.len(),
            record.sonar_model,
            options.engine
        );
        Ok(written)
    }
}

impl fmt::Display for SaveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveRule::PrimaryAndSecondary => f.write_str("Beam_group1[+2]"),
            SaveRule::EveryBeamGroup => f.write_str("all beam groups"),
        }
    }
}
