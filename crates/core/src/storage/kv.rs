//! Key-value persistence
//!
//! Stores opaque string values under string keys.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::Result;

/// Key-value store
pub struct KeyValueStore<'a> {
    conn: &'a Connection,
}

impl<'a> KeyValueStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert or replace the value for a key
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Load the value for a key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    #[test]
    fn test_put_get_replace() {
        let db = Database::open_in_memory().unwrap();
        let store = db.kv();

        store.put("settings", "one").unwrap();
        store.put("settings", "two").unwrap();
        assert_eq!(store.get("settings").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_get_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.kv().get("nothing").unwrap().is_none());
    }
}
