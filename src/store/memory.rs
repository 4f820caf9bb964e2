//! In-memory position store.

use crate::error::Result;

use super::{PositionRecord, PositionStore};

/// Position store that keeps the record in RAM.
///
/// Nothing survives a power cycle. Useful on targets without a filesystem
/// and for tests, which can inspect the last saved record and the number of
/// writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Option<PositionRecord>,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `record`.
    pub fn with_record(record: PositionRecord) -> Self {
        Self {
            record: Some(record),
            writes: 0,
        }
    }

    /// Last saved record, if any.
    pub fn record(&self) -> Option<&PositionRecord> {
        self.record.as_ref()
    }

    /// Number of `save` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PositionStore for MemoryStore {
    fn load(&mut self) -> Result<PositionRecord> {
        Ok(self.record.clone().unwrap_or_default())
    }

    fn save(&mut self, record: &PositionRecord) -> Result<()> {
        self.record = Some(record.clone());
        self.writes += 1;
        Ok(())
    }
}
