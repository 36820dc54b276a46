use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{StorageError, StorageResult};

use super::KeyValueStore;

#[derive(Debug, Default)]
struct Inner {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory key-value store
///
/// Clones share the same contents, so a second profile store built over a
/// clone sees what the first one wrote, as a restarted process would.
/// Reads and writes can be switched to fail for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent reads fail (or succeed again)
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Returns true if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // a panicked writer cannot leave the map half-updated
        self.inner
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("read of '{key}' refused")));
        }
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "write of '{key}' refused"
            )));
        }
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
