//! Key/value bag shared by every stage of a run.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// An open-ended key/value mapping shared by all stages of a run.
///
/// Clones are handles onto the same storage: a value written through one
/// clone is visible through every other. Any stage may write any key and the
/// last writer wins. Stages of one run never execute concurrently, so the
/// lock is uncontended unless the caller shares one context across runs
/// it drives in parallel.
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: Arc<RwLock<HashMap<String, Value>>>,
}

impl Context {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from existing data.
    #[must_use]
    pub fn from_data(data: HashMap<String, Value>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Gets a value from the context.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.read().get(key).cloned()
    }

    /// Gets a value and deserializes it into `T`.
    ///
    /// Returns `None` if the key is missing or the value has another shape.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Sets a value, returning the one it replaced.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.write().insert(key.into(), value.into())
    }

    /// Sets a value only if the key is not present yet.
    ///
    /// Returns true if the value was inserted.
    pub fn set_if_absent(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let mut data = self.data.write();

        if data.contains_key(&key) {
            return false;
        }

        data.insert(key, value.into());
        true
    }

    /// Removes a key, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.write().remove(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.data.write().clear();
    }

    /// Returns a point-in-time copy of all data.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.data.read().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Returns all keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns true if both handles point at the same storage.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(data: HashMap<String, Value>) -> Self {
        Self::from_data(data)
    }
}
