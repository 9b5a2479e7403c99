use crate::cache::{CacheClient, CacheError};
use parking_lot::RwLock;
use std::collections::HashMap;

///
/// MemoryCache
///
/// Process-local cache client. Suitable for single-process deployments and
/// as the shared cache in tests.
///

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    max_value_bytes: Option<usize>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values larger than `max_value_bytes`, like hosted caches do.
    #[must_use]
    pub fn with_max_value_bytes(max_value_bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            max_value_bytes: Some(max_value_bytes),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl CacheClient for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        if let Some(max) = self.max_value_bytes
            && value.len() > max
        {
            return Err(CacheError::rejected(format!(
                "value of {} bytes exceeds limit of {max} bytes",
                value.len()
            )));
        }

        self.entries.write().insert(key.to_string(), value);

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().remove(key);

        Ok(())
    }
}

///
/// TESTS
///
