//! Embedded schema migrations for per-project ledger stores.
//!
//! Migrations are SQL files compiled into the library via `include_str!`,
//! applied sequentially whenever a store is opened for writing and tracked
//! in the `_causeway_migrations` table. Each migration runs exactly once
//! per store file, so stores created by older releases upgrade in place on
//! their next write.

use rusqlite::Connection;

use crate::error::LedgerError;

/// A single embedded migration.
struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. New migrations are appended here.
const MIGRATIONS: &[Migration] = &[Migration {
    name: "000_lineage_tables",
    sql: include_str!("schema/000_lineage_tables.sql"),
}];

/// Runs all pending migrations against the given store connection.
///
/// Returns the number of migrations applied. Migrations recorded in
/// `_causeway_migrations` are skipped.
pub(crate) fn apply(conn: &Connection) -> Result<usize, LedgerError> {
    // The tracking table must exist before we can check what has been
    // applied.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _causeway_migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let mut applied = 0;

    for migration in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM _causeway_migrations WHERE name = ?1",
            [migration.name],
            |row| row.get(0),
        )?;

        if already_applied {
            continue;
        }

        tracing::debug!(migration = migration.name, "applying store migration");

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO _causeway_migrations (name) VALUES (?1)",
            [migration.name],
        )?;
        tx.commit()?;

        applied += 1;
    }

    Ok(applied)
}
