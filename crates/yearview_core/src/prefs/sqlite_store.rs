//! SQLite-backed preference store.
//!
//! # Invariants
//! - One row per key; saving replaces the previous value.
//! - Values are JSON text.

use super::{PreferenceError, PreferenceResult, PreferenceStore};
use crate::db::{open_store, open_store_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

pub struct SqlitePreferenceStore {
    conn: Connection,
}

impl SqlitePreferenceStore {
    /// Opens (or creates) a preference file and migrates it.
    pub fn open(path: impl AsRef<Path>) -> PreferenceResult<Self> {
        Ok(Self {
            conn: open_store(path)?,
        })
    }

    pub fn open_in_memory() -> PreferenceResult<Self> {
        Ok(Self {
            conn: open_store_in_memory()?,
        })
    }

    /// Wraps a connection already opened through `db::open_store*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn load(&self, key: &str) -> PreferenceResult<Option<Value>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        text.map(|text| {
            serde_json::from_str(&text).map_err(|source| PreferenceError::Decode {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    fn save(&self, key: &str, value: &Value) -> PreferenceResult<()> {
        let text = serde_json::to_string(value).map_err(PreferenceError::Encode)?;
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at)
             VALUES (?1, ?2, CAST(strftime('%s', 'now') AS INTEGER))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, text],
        )?;
        Ok(())
    }
}
