//! Schema migrations for the entry cache.
//!
//! Applied migrations are recorded in `schema_history` with their name, so a
//! cache file can be checked for the layout it carries. Each migration runs in
//! its own transaction together with its history row.

use chrono::Utc;
use tokio_rusqlite::{Connection, params, rusqlite};

use super::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version; versions are never reused.
const MIGRATIONS: &[Migration] =
    &[Migration { version: 1, name: "entries", sql: include_str!("../../migrations/001_entries.sql") }];

/// Apply every migration newer than the recorded schema version.
///
/// # Errors
///
/// Returns [`Error::MigrationFailed`] naming the migration whose SQL failed.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_history (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )?;

        let applied = current_version(conn)?;
        for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql).map_err(|e| {
                Error::MigrationFailed(format!("{} (version {}): {e}", migration.name, migration.version))
            })?;
            tx.execute(
                "INSERT INTO schema_history (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::info!(version = migration.version, name = migration.name, "cache schema migrated");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

fn current_version(conn: &rusqlite::Connection) -> Result<i64, Error> {
    Ok(conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_history", [], |row| row.get(0))?)
}
