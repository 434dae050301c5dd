//! Shared handle to the local settings database.

use std::path::Path;
use std::sync::{Arc, Mutex};

use fale_shared::{ClientError, Result};
use fale_store::{Database, StoreError};

/// `rusqlite::Connection` is not `Sync`, so every component shares the
/// database behind one mutex.
#[derive(Clone)]
pub struct SharedDatabase {
    inner: Arc<Mutex<Database>>,
}

impl SharedDatabase {
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(Mutex::new(db)),
        }
    }

    /// Open `fale.db` in `dir`, or in the platform data directory.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        let db = match dir {
            Some(dir) => Database::open_in(dir),
            None => Database::new(),
        }
        .map_err(store_error)?;
        Ok(Self::new(db))
    }

    pub fn in_memory() -> Result<Self> {
        Database::open_in_memory().map(Self::new).map_err(store_error)
    }

    /// Run `f` against the database. The lock is never held across an await.
    pub fn with<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> fale_store::Result<T>,
    {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&guard).map_err(store_error)
    }
}

fn store_error(e: StoreError) -> ClientError {
    ClientError::Storage(e.to_string())
}
