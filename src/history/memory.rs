//! In-memory history backend
//!
//! Entries are shared across clones, so a test can hand one handle to a
//! worker and inspect what it recorded through another.

use std::sync::Arc;

use parking_lot::Mutex;

use super::HistoryStore;
use crate::clipboard::Snapshot;
use crate::error::Result;

/// History kept in a shared `Vec`, nothing persisted.
#[derive(Clone, Default)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, snapshot: &Snapshot) -> Result<()> {
        self.entries.lock().push(snapshot.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Snapshot>> {
        Ok(self.entries.lock().clone())
    }

    fn last(&self) -> Result<Option<Snapshot>> {
        Ok(self.entries.lock().last().cloned())
    }
}
