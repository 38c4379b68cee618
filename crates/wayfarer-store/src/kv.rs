//! The `KvStore` trait -- the adapter interface for local key-value storage.
//!
//! Values are opaque strings. The planner is the only reader and writer of
//! its keys, so implementations need no cross-process coordination.

use thiserror::Error;

/// Errors returned by a [`KvStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded writing {key:?}: {needed} bytes needed, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("I/O error on key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store key {0:?} (expected ASCII letters, digits, '.', '_' or '-')")]
    InvalidKey(String),
}

/// A small synchronous key-value store.
///
/// The trait is object-safe so the planner can hold an `Arc<dyn KvStore>`.
pub trait KvStore: Send + Sync {
    /// Read the value under `key`. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Reject keys that would not map cleanly onto a file name.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !key.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}

// Compile-time assertion: KvStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn KvStore) {}
};
