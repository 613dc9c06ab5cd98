//! Lock store implementations

use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{LockRecord, LockStore};
use crate::risk::RiskError;

/// Lock persisted as a JSON file
#[derive(Debug, Clone)]
pub struct FileLockStore {
    path: PathBuf,
}

impl FileLockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LockStore for FileLockStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> Result<Option<LockRecord>, RiskError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write(&self, record: &LockRecord) -> Result<(), RiskError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write then rename so a reader never sees a half-written lock
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn delete(&self) -> Result<(), RiskError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process lock, for tests and single-process embedding
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    record: Mutex<Option<LockRecord>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockStore for MemoryLockStore {
    fn exists(&self) -> bool {
        self.record.lock().is_some()
    }

    fn read(&self) -> Result<Option<LockRecord>, RiskError> {
        Ok(self.record.lock().clone())
    }

    fn write(&self, record: &LockRecord) -> Result<(), RiskError> {
        *self.record.lock() = Some(record.clone());
        Ok(())
    }

    fn delete(&self) -> Result<(), RiskError> {
        *self.record.lock() = None;
        Ok(())
    }
}
