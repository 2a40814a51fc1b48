//! Per-project ledger stores.
//!
//! One SQLite file backs one project, holding the two lineage tables.
//! Stores are opened lazily: the write path creates the file and applies
//! the schema on first use, the read path only ever opens an existing file
//! — a project with no ledger yet must report "no prior event", not grow
//! an empty store as a side effect of being asked.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use causeway_types::Lineage;

use crate::error::LedgerError;
use crate::schema;

/// Busy timeout for store connections, in milliseconds.
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// The two lineage tables within a project store.
///
/// Disjoint namespaces: a branch named like a change id stays in its own
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerTable {
    /// Branch-scoped lineage ("source change submitted").
    Submitted,
    /// Change-scoped lineage ("source change created").
    Created,
}

impl LedgerTable {
    /// Returns the SQL table name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted_events",
            Self::Created => "created_events",
        }
    }
}

impl From<Lineage> for LedgerTable {
    fn from(lineage: Lineage) -> Self {
        match lineage {
            Lineage::Branch => Self::Submitted,
            Lineage::Change => Self::Created,
        }
    }
}

impl std::fmt::Display for LedgerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single physical store backing one project.
#[derive(Debug)]
pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    /// Opens an existing store read-only. Never creates the file.
    ///
    /// Callers on the read path check for the file first and treat absence
    /// as "no prior event"; reaching this function with a missing file is
    /// an error.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        Ok(Self { conn })
    }

    /// Opens the store for writing, creating the file and applying schema
    /// migrations as needed.
    ///
    /// WAL journal mode, so lock-free readers see the last completed write
    /// without blocking the writer.
    pub fn create(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;

        // Set WAL mode and verify it was accepted.
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        if journal_mode != "wal" && journal_mode != "memory" {
            return Err(LedgerError::Store(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!(
                    "failed to set WAL journal mode, got: {journal_mode}"
                )),
            )));
        }

        schema::apply(&conn)?;
        Ok(Self { conn })
    }

    /// Returns the stored event id for `key` in `table`, or `None` if the
    /// key is unset.
    ///
    /// Failure is reserved for I/O and corruption; an absent key is a
    /// normal result.
    pub fn get(&self, table: LedgerTable, key: &str) -> Result<Option<String>, LedgerError> {
        // Table names come from the LedgerTable enum, never from input.
        let sql = format!(
            "SELECT event_id FROM {} WHERE lineage_key = ?1",
            table.as_str()
        );
        let event_id = self
            .conn
            .query_row(&sql, params![key], |row| row.get(0))
            .optional()?;
        Ok(event_id)
    }

    /// Creates a new entry for `key`.
    ///
    /// Assumes the key is absent; inserting an existing key violates the
    /// primary key and surfaces as [`LedgerError::Store`]. Callers check
    /// with [`LedgerStore::get`] first, under the store's lock.
    pub fn insert(
        &self,
        table: LedgerTable,
        key: &str,
        event_id: &str,
    ) -> Result<(), LedgerError> {
        let sql = format!(
            "INSERT INTO {} (lineage_key, event_id) VALUES (?1, ?2)",
            table.as_str()
        );
        self.conn.execute(&sql, params![key, event_id])?;
        Ok(())
    }

    /// Overwrites the entry for an existing `key` in the selected table.
    pub fn update(
        &self,
        table: LedgerTable,
        key: &str,
        event_id: &str,
    ) -> Result<(), LedgerError> {
        let sql = format!(
            "UPDATE {} SET event_id = ?2 WHERE lineage_key = ?1",
            table.as_str()
        );
        self.conn.execute(&sql, params![key, event_id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> LedgerStore {
        LedgerStore::create(&dir.path().join("proj.db")).expect("store creation should succeed")
    }

    #[test]
    fn get_on_empty_store_returns_none() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let store = store_in(&dir);

        let value = store
            .get(LedgerTable::Submitted, "master")
            .expect("get should succeed");
        assert_eq!(value, None);
    }

    #[test]
    fn insert_then_get_round_trips() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let store = store_in(&dir);

        store
            .insert(LedgerTable::Submitted, "master", "evt-100")
            .expect("insert should succeed");

        let value = store
            .get(LedgerTable::Submitted, "master")
            .expect("get should succeed");
        assert_eq!(value.as_deref(), Some("evt-100"));
    }

    #[test]
    fn update_replaces_value_in_selected_table() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let store = store_in(&dir);

        store
            .insert(LedgerTable::Created, "Iabc123", "evt-1")
            .expect("insert should succeed");
        store
            .update(LedgerTable::Created, "Iabc123", "evt-2")
            .expect("update should succeed");

        let value = store
            .get(LedgerTable::Created, "Iabc123")
            .expect("get should succeed");
        assert_eq!(value.as_deref(), Some("evt-2"));

        // The branch-scoped table is untouched.
        let other = store
            .get(LedgerTable::Submitted, "Iabc123")
            .expect("get should succeed");
        assert_eq!(other, None);
    }

    #[test]
    fn tables_do_not_cross_contaminate() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let store = store_in(&dir);

        store
            .insert(LedgerTable::Submitted, "same-key", "evt-submitted")
            .expect("insert should succeed");
        store
            .insert(LedgerTable::Created, "same-key", "evt-created")
            .expect("insert should succeed");

        let submitted = store
            .get(LedgerTable::Submitted, "same-key")
            .expect("get should succeed");
        let created = store
            .get(LedgerTable::Created, "same-key")
            .expect("get should succeed");

        assert_eq!(submitted.as_deref(), Some("evt-submitted"));
        assert_eq!(created.as_deref(), Some("evt-created"));
    }

    #[test]
    fn duplicate_insert_is_an_error() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let store = store_in(&dir);

        store
            .insert(LedgerTable::Submitted, "master", "evt-1")
            .expect("insert should succeed");
        let err = store
            .insert(LedgerTable::Submitted, "master", "evt-2")
            .expect_err("duplicate insert should fail");

        assert!(matches!(err, LedgerError::Store(_)));
    }

    #[test]
    fn open_never_creates_a_missing_store() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let path = dir.path().join("absent.db");

        let result = LedgerStore::open(&path);
        assert!(result.is_err(), "open should not create the file");
        assert!(!path.exists(), "open must leave no file behind");
    }

    #[test]
    fn create_reopens_existing_store_without_reapplying_schema() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let path = dir.path().join("proj.db");

        let store = LedgerStore::create(&path).expect("creation should succeed");
        store
            .insert(LedgerTable::Submitted, "master", "evt-1")
            .expect("insert should succeed");
        drop(store);

        let reopened = LedgerStore::create(&path).expect("reopen should succeed");
        let value = reopened
            .get(LedgerTable::Submitted, "master")
            .expect("get should succeed");
        assert_eq!(value.as_deref(), Some("evt-1"));
    }
}
