use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;

use super::PersistenceError;
use crate::db::{self, open_database, open_memory_database};

/// Opaque key-value store holding serialized records.
pub trait StateBackend: Send {
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn save_raw(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// SQLite-backed store over the `app_state` table.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn in_memory() -> Result<Self, PersistenceError> {
        Ok(Self {
            conn: open_memory_database()?,
        })
    }
}

impl StateBackend for SqliteBackend {
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(db::get_state(&self.conn, key)?)
    }

    fn save_raw(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        Ok(db::set_state(&self.conn, key, value)?)
    }
}

/// Process-local store; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBackend for MemoryBackend {
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save_raw(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(backend: &mut dyn StateBackend) {
        assert!(backend.load_raw("healthwise_user").unwrap().is_none());
        backend.save_raw("healthwise_user", "{\"age\":40}").unwrap();
        backend.save_raw("healthwise_user", "{\"age\":41}").unwrap();
        assert_eq!(
            backend.load_raw("healthwise_user").unwrap().as_deref(),
            Some("{\"age\":41}")
        );
    }

    #[test]
    fn memory_backend_round_trip() {
        exercise(&mut MemoryBackend::new());
    }

    #[test]
    fn sqlite_backend_round_trip() {
        exercise(&mut SqliteBackend::in_memory().unwrap());
    }

    #[test]
    fn sqlite_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthwise.db");
        {
            let mut backend = SqliteBackend::open(&path).unwrap();
            backend.save_raw("k", "v").unwrap();
        }
        let backend = SqliteBackend::open(&path).unwrap();
        assert_eq!(backend.load_raw("k").unwrap().as_deref(), Some("v"));
    }
}
