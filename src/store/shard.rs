//! A single partition of the store

use std::collections::HashMap;

use parking_lot::RwLock;

/// One independently-locked partition. The map is only touched while
/// holding this shard's lock.
#[derive(Debug, Default)]
pub(crate) struct Shard {
    data: RwLock<HashMap<String, String>>,
}

impl Shard {
    pub(crate) fn put(&self, key: String, value: String) {
        self.data.write().insert(key, value);
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.data.read().get(key).cloned()
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Returns whether a value was removed
    pub(crate) fn delete(&self, key: &str) -> bool {
        self.data.write().remove(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.data.read().len()
    }
}
