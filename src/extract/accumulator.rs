//! Entity accumulation with last-write-wins consolidation.

use std::collections::BTreeMap;

use crate::types::{EntityTable, ExtractedRecord};

/// Mutable builder for an [`EntityTable`].
///
/// The extractor folds records in file order; [`EntityAccumulator::finalize`]
/// consumes the accumulator, so the type system rules out upserts after the
/// table is frozen.
#[derive(Debug, Default)]
pub struct EntityAccumulator {
    records: BTreeMap<String, ExtractedRecord>,
}

impl EntityAccumulator {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, replacing any existing entry for its key wholesale.
    ///
    /// Replacement is whole-record, not a per-attribute merge: attributes the
    /// previous row carried do not survive, even when the new row leaves them
    /// empty. Observed behavior of the system this reproduces; preserved.
    pub fn upsert(&mut self, record: ExtractedRecord) {
        self.records.insert(record.entity_key.clone(), record);
    }

    /// Number of distinct keys accumulated so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Freeze into an immutable [`EntityTable`].
    pub fn finalize(self) -> EntityTable {
        EntityTable::from_records(self.records)
    }
}
