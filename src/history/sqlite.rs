//! SQLite history backend
//!
//! One table, one row per snapshot, insertion order preserved by rowid.
//! A single connection sits behind a mutex; clones hand the same store to
//! the monitor and the picker.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::HistoryStore;
use crate::clipboard::{ContentKind, Snapshot};
use crate::error::Result;

/// Default database location under the local data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("clipkeep")
        .join("history.db")
}

/// History stored in a SQLite file.
#[derive(Clone)]
pub struct SqliteHistory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistory {
    /// Open the history database, creating the file and schema as needed.
    ///
    /// Failure here is a startup failure: without storage there is no
    /// history to record or recall.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create history directory {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open history database at {:?}", path))?;

        // WAL lets the picker read while an append is pending
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .context("Failed to enable WAL mode")?;
        debug!("Enabled WAL mode for history database");

        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .context("Failed to set busy_timeout")?;
        debug!("Set SQLite busy_timeout to 5000ms");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                text TEXT,
                unicode_text TEXT,
                file_list TEXT,
                html TEXT,
                timestamp INTEGER NOT NULL
            )",
            [],
        )
        .context("Failed to create history table")?;

        info!(path = %path.display(), "History database ready");
        Ok(SqliteHistory {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl HistoryStore for SqliteHistory {
    fn append(&self, snapshot: &Snapshot) -> Result<()> {
        let file_list = match &snapshot.file_list {
            Some(paths) => Some(serde_json::to_string(paths)?),
            None => None,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO history (id, kind, text, unicode_text, file_list, html, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Uuid::new_v4().to_string(),
                snapshot.kind.as_str(),
                snapshot.text,
                snapshot.unicode_text,
                file_list,
                snapshot.html,
                chrono::Utc::now().timestamp_millis(),
            ],
        )?;
        debug!(kind = snapshot.kind.as_str(), "Appended history entry");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Snapshot>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT kind, text, unicode_text, file_list, html FROM history ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], row_to_snapshot)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn last(&self) -> Result<Option<Snapshot>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT kind, text, unicode_text, file_list, html FROM history
             ORDER BY rowid DESC LIMIT 1",
        )?;
        let snapshot = stmt.query_row([], row_to_snapshot).optional()?;
        Ok(snapshot)
    }
}

/// Map one row back to a snapshot. An unreadable file-list cell logs and
/// degrades to no list rather than failing the whole read.
fn row_to_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snapshot> {
    let kind: String = row.get(0)?;
    let file_list_json: Option<String> = row.get(3)?;
    let file_list = file_list_json.and_then(|json| {
        match serde_json::from_str::<Vec<String>>(&json) {
            Ok(paths) => Some(paths),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable file list cell");
                None
            }
        }
    });

    Ok(Snapshot {
        kind: ContentKind::from_str_or_none(&kind),
        text: row.get(1)?,
        unicode_text: row.get(2)?,
        file_list,
        html: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, SqliteHistory) {
        let dir = TempDir::new().unwrap();
        let store = SqliteHistory::open(&dir.path().join("nested").join("history.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let (dir, store) = open_temp();
        assert!(dir.path().join("nested").join("history.db").exists());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let (_dir, store) = open_temp();
        store.append(&Snapshot::unicode("a")).unwrap();
        store.append(&Snapshot::unicode("b")).unwrap();
        store.append(&Snapshot::ansi("c")).unwrap();

        assert_eq!(
            store.read_all().unwrap(),
            vec![
                Snapshot::unicode("a"),
                Snapshot::unicode("b"),
                Snapshot::ansi("c"),
            ]
        );
    }

    #[test]
    fn test_last_returns_newest_entry() {
        let (_dir, store) = open_temp();
        assert_eq!(store.last().unwrap(), None);

        store.append(&Snapshot::unicode("old")).unwrap();
        store.append(&Snapshot::unicode("new")).unwrap();
        assert_eq!(store.last().unwrap(), Some(Snapshot::unicode("new")));
    }

    #[test]
    fn test_every_kind_round_trips() {
        let entries = vec![
            Snapshot::unicode("uni").with_html("<b>uni</b>"),
            Snapshot::ansi("legacy"),
            Snapshot::files(["C:\\a.txt", "C:\\b.txt"]),
            Snapshot::html_fragment("<p>only html</p>"),
        ];

        let (_dir, store) = open_temp();
        for entry in &entries {
            store.append(entry).unwrap();
        }
        assert_eq!(store.read_all().unwrap(), entries);
    }

    #[test]
    fn test_clones_share_one_store() {
        let (_dir, store) = open_temp();
        let reader = store.clone();

        store.append(&Snapshot::unicode("shared")).unwrap();
        assert_eq!(reader.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_sees_previous_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.db");
        {
            let store = SqliteHistory::open(&path).unwrap();
            store.append(&Snapshot::unicode("persisted")).unwrap();
        }

        let store = SqliteHistory::open(&path).unwrap();
        assert_eq!(
            store.read_all().unwrap(),
            vec![Snapshot::unicode("persisted")]
        );
    }
}
