//! Clipboard history storage
//!
//! An append-only log of snapshots, oldest first. The trait is the seam
//! between the monitor/picker and the concrete backend: SQLite is the
//! shipped backend, and an in-memory store backs the tests.

mod memory;
mod sqlite;

pub use memory::MemoryHistory;
pub use sqlite::{default_db_path, SqliteHistory};

use crate::clipboard::Snapshot;
use crate::error::Result;

/// Append-only snapshot log.
///
/// Takes `&self` throughout; implementations guard their own interior so
/// one store value can be shared between the monitor and the picker.
pub trait HistoryStore {
    /// Append one snapshot after the current tail.
    fn append(&self, snapshot: &Snapshot) -> Result<()>;

    /// All snapshots in insertion order, oldest first.
    fn read_all(&self) -> Result<Vec<Snapshot>>;

    /// The most recently appended snapshot, if any. Backends with a cheap
    /// tail read should override this.
    fn last(&self) -> Result<Option<Snapshot>> {
        let mut entries = self.read_all()?;
        Ok(entries.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal store that leans on the default `last`.
    struct VecStore(std::cell::RefCell<Vec<Snapshot>>);

    impl HistoryStore for VecStore {
        fn append(&self, snapshot: &Snapshot) -> Result<()> {
            self.0.borrow_mut().push(snapshot.clone());
            Ok(())
        }

        fn read_all(&self) -> Result<Vec<Snapshot>> {
            Ok(self.0.borrow().clone())
        }
    }

    #[test]
    fn test_default_last_is_the_newest_entry() {
        let store = VecStore(std::cell::RefCell::new(Vec::new()));
        assert_eq!(store.last().unwrap(), None);

        store.append(&Snapshot::unicode("old")).unwrap();
        store.append(&Snapshot::unicode("new")).unwrap();
        assert_eq!(store.last().unwrap(), Some(Snapshot::unicode("new")));
    }
}
