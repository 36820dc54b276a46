//! Persistence collaborators for the profile store
//!
//! The profile store only needs a text key-value store: it writes the whole
//! collection as one blob under [`PROFILES_KEY`] and reads it back on load.
//! [`MemoryStore`] backs tests and ephemeral sessions, [`FileStore`] keeps one
//! file per key inside the config directory.

mod file;
mod memory;

use std::sync::Arc;

use crate::error::StorageResult;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key under which the profile collection is stored
pub const PROFILES_KEY: &str = "vpn_configs";

/// A text key-value store
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing is stored
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
