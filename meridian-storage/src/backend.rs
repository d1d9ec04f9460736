// ABOUTME: Embedded sled database backend shared across tenancy, security, and ESS-cache state
// ABOUTME: Sled's API is synchronous; all calls are wrapped in spawn_blocking by callers

use crate::error::Result;
use std::path::PathBuf;

/// Embedded sled database backend for persistent tenant state.
#[derive(Clone)]
pub struct SledBackend {
    db: sled::Db,
}

impl std::fmt::Debug for SledBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledBackend").finish_non_exhaustive()
    }
}

impl SledBackend {
    /// Open (or create) a sled database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(path: PathBuf) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Open an in-memory, non-persistent database. Used by tests and by
    /// `memory://` deployments that don't need a real DSN.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub(crate) fn insert(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.db.insert(key, value)?;
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    pub(crate) fn remove(&self, key: &[u8]) -> Result<bool> {
        let existed = self.db.remove(key)?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    pub(crate) fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut out = Vec::new();
        for item in self.db.scan_prefix(prefix) {
            let (k, v) = item?;
            out.push((k.to_vec(), v.to_vec()));
        }
        Ok(out)
    }

    pub(crate) fn remove_prefix(&self, prefix: &[u8]) -> Result<usize> {
        let keys: Vec<_> = self
            .db
            .scan_prefix(prefix)
            .keys()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let count = keys.len();
        for key in keys {
            self.db.remove(key)?;
        }
        self.db.flush()?;
        Ok(count)
    }
}
