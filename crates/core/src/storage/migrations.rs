//! Schema versioning
//!
//! Each step runs inside its own transaction together with the row that
//! records it, so a crash never leaves a half-applied version behind.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, instrument};

use crate::error::Result;

struct Step {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Versions must stay contiguous from 1
const STEPS: &[Step] = &[Step {
    version: 1,
    description: "Key-value table for the persisted bundle",
    sql: "CREATE TABLE IF NOT EXISTS kv_store (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL
          );",
}];

fn applied_version(conn: &Connection) -> Result<u32> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<u32>>(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

/// Bring the schema up to the newest version
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version INTEGER PRIMARY KEY,
             description TEXT NOT NULL,
             applied_at TEXT NOT NULL
         );",
    )?;

    let from = applied_version(conn)?;
    let pending: Vec<&Step> = STEPS.iter().filter(|s| s.version > from).collect();
    if pending.is_empty() {
        debug!(version = from, "Schema up to date");
        return Ok(());
    }

    for step in pending {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(step.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            params![step.version, step.description, chrono::Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        info!(version = step.version, description = step.description, "Applied schema step");
    }

    info!(from, to = applied_version(conn)?, "Schema upgraded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newest() -> u32 {
        STEPS.last().map(|s| s.version).unwrap_or(0)
    }

    #[test]
    fn test_fresh_database_reaches_newest_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(applied_version(&conn).unwrap(), newest());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_rerun_keeps_one_row_per_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows as usize, STEPS.len());
    }

    #[test]
    fn test_versions_are_contiguous() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "{}", step.description);
        }
    }
}
