//! Persistence of the single current-user record.

pub mod backend;
pub mod merge;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

pub use backend::{MemoryBackend, SqliteBackend, StateBackend};
pub use merge::merge;

use crate::config::USER_STATE_KEY;
use crate::db::DatabaseError;
use crate::models::record::UserRecord;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Could not access saved data: {0}")]
    Database(#[from] DatabaseError),

    #[error("Could not serialize saved data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Outcome of a read-modify-write. The mutated record is returned even
/// when saving it failed.
#[derive(Debug)]
pub struct Mutation<T> {
    pub record: UserRecord,
    pub output: T,
    pub persisted: Result<(), PersistenceError>,
}

/// Owns the stored user record. One mutation is in flight at a time.
pub struct StateStore {
    backend: Mutex<Box<dyn StateBackend>>,
}

impl StateStore {
    pub fn new(backend: impl StateBackend + 'static) -> Self {
        Self {
            backend: Mutex::new(Box::new(backend)),
        }
    }

    /// SQLite store at `path`, creating and migrating it as needed.
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        Ok(Self::new(SqliteBackend::open(path)?))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    fn backend(&self) -> Result<MutexGuard<'_, Box<dyn StateBackend>>, PersistenceError> {
        self.backend.lock().map_err(|_| PersistenceError::LockPoisoned)
    }

    /// Stored record merged onto current defaults, or None on first run.
    pub fn load(&self) -> Result<Option<UserRecord>, PersistenceError> {
        let backend = self.backend()?;
        load_from(&**backend)
    }

    pub fn load_or_default(&self) -> Result<UserRecord, PersistenceError> {
        Ok(self.load()?.unwrap_or_default())
    }

    pub fn save(&self, record: &UserRecord) -> Result<(), PersistenceError> {
        let mut backend = self.backend()?;
        save_to(&mut **backend, record)
    }

    /// Load, apply `f`, save, all under the store lock.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&mut UserRecord) -> T,
    ) -> Result<Mutation<T>, PersistenceError> {
        let mut backend = self.backend()?;
        let mut record = load_from(&**backend)?.unwrap_or_default();
        let output = f(&mut record);
        let persisted = save_to(&mut **backend, &record);
        if let Err(e) = &persisted {
            tracing::warn!(error = %e, "Failed to save user record");
        }
        Ok(Mutation {
            record,
            output,
            persisted,
        })
    }
}

fn load_from(backend: &dyn StateBackend) -> Result<Option<UserRecord>, PersistenceError> {
    let Some(raw) = backend.load_raw(USER_STATE_KEY)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored user record is not valid JSON, using defaults");
        serde_json::Value::Null
    });
    Ok(Some(merge(&UserRecord::default(), &value)))
}

fn save_to(backend: &mut dyn StateBackend, record: &UserRecord) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(record)?;
    backend.save_raw(USER_STATE_KEY, &json)
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::testing::ReadOnlyBackend;
    use super::*;

    #[test]
    fn first_run_has_no_record() {
        let store = StateStore::in_memory();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.load_or_default().unwrap(), UserRecord::default());
    }

    #[test]
    fn save_then_load() {
        let store = StateStore::in_memory();
        let mut record = UserRecord::default();
        record.full_name = "Sam Rivera".into();
        record.age = 44;
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn older_record_gains_new_fields() {
        let store = StateStore::new(ReadOnlyBackend {
            stored: Some(r#"{"fullName":"Old Timer","age":61,"completedRecommendations":["exercise-0"]}"#.into()),
        });
        let record = store.load().unwrap().unwrap();
        assert_eq!(record.full_name, "Old Timer");
        assert_eq!(record.age, 61);
        assert_eq!(record.medications, UserRecord::default().medications);
        assert!(record.completed_recommendation_ids.contains("exercise-0"));
    }

    #[test]
    fn corrupt_json_loads_defaults() {
        let store = StateStore::new(ReadOnlyBackend {
            stored: Some("{not json".into()),
        });
        assert_eq!(store.load().unwrap(), Some(UserRecord::default()));
    }

    #[test]
    fn update_returns_record_when_save_fails() {
        let store = StateStore::new(ReadOnlyBackend::default());
        let mutation = store.update(|r| {
            r.age = 52;
            r.age
        });
        let mutation = mutation.unwrap();
        assert_eq!(mutation.record.age, 52);
        assert_eq!(mutation.output, 52);
        assert!(mutation.persisted.is_err());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthwise.db");
        {
            let store = StateStore::open(&path).unwrap();
            store.update(|r| r.full_name = "Persisted Person".into()).unwrap();
        }
        let store = StateStore::open(&path).unwrap();
        assert_eq!(store.load_or_default().unwrap().full_name, "Persisted Person");
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let store = Arc::new(StateStore::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .update(|r| {
                            r.completed_recommendation_ids.insert(format!("exercise-{i}"));
                        })
                        .unwrap()
                        .persisted
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.load_or_default().unwrap().completed_recommendation_ids.len(), 8);
    }
}
