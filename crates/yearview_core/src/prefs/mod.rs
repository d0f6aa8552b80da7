//! Persistent view preferences.
//!
//! # Responsibility
//! - Define the key/value preference store contract.
//! - Provide in-memory and SQLite implementations.
//! - Expose typed accessors with documented defaults (`Preferences`).
//!
//! # Invariants
//! - Values are stored as JSON.
//! - Typed accessors never fail: errors are logged and defaults returned.

pub mod preferences;
pub mod sqlite_store;

use crate::db::StoreError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

pub use preferences::{Preferences, RefreshSettings, SelectedCalendars, ThemePreference};
pub use sqlite_store::SqlitePreferenceStore;

pub type PreferenceResult<T> = Result<T, PreferenceError>;

#[derive(Debug)]
pub enum PreferenceError {
    Store(StoreError),
    /// Stored value is not valid JSON.
    Decode {
        key: String,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
}

impl Display for PreferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Decode { key, source } => {
                write!(f, "stored preference `{key}` is not valid JSON: {source}")
            }
            Self::Encode(err) => write!(f, "failed to encode preference: {err}"),
        }
    }
}

impl Error for PreferenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StoreError> for PreferenceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for PreferenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(value))
    }
}

/// Key/value preference persistence.
pub trait PreferenceStore {
    /// Returns the stored value, or `None` when the key was never saved.
    fn load(&self, key: &str) -> PreferenceResult<Option<Value>>;
    fn save(&self, key: &str, value: &Value) -> PreferenceResult<()>;
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for &P {
    fn load(&self, key: &str) -> PreferenceResult<Option<Value>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &Value) -> PreferenceResult<()> {
        (**self).save(key, value)
    }
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for Box<P> {
    fn load(&self, key: &str) -> PreferenceResult<Option<Value>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &Value) -> PreferenceResult<()> {
        (**self).save(key, value)
    }
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &str) -> PreferenceResult<Option<Value>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> PreferenceResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.clone());
        Ok(())
    }
}
