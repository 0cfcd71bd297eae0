use std::collections::BTreeMap;

use super::{GroupPayload, GroupStore, SaveOptions, StoreError};

/// One write seen by a [`MemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct SavedGroup {
    /// Group name
    pub group: String,
    /// Samples written
    pub samples: usize,
    /// Options the group was written with
    pub options: SaveOptions,
    /// Group attributes
    pub attrs: BTreeMap<String, String>,
}

/// Store that only records writes, in order
#[derive(Debug, Default)]
pub struct MemoryStore {
    writes: Vec<SavedGroup>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write, oldest first
    pub fn writes(&self) -> &[SavedGroup] {
        &self.writes
    }

    /// Names of the written groups, in write order
    pub fn group_names(&self) -> Vec<&str> {
        self.writes.iter().map(|w| w.group.as_str()).collect()
    }

    /// Latest write of `group`
    pub fn get(&self, group: &str) -> Option<&SavedGroup> {
        self.writes.iter().rev().find(|w| w.group == group)
    }
}

impl GroupStore for MemoryStore {
    fn write_group(
        &mut self,
        group: &str,
        payload: GroupPayload<'_>,
        options: &SaveOptions,
    ) -> Result<(), StoreError> {
        self.writes.push(SavedGroup {
            group: group.to_string(),
            samples: payload.sample_count(),
            options: options.clone(),
            attrs: payload.attrs(),
        });
        Ok(())
    }
}
