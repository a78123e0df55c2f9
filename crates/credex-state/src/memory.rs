//! # In-Memory Registry
//!
//! A `HashMap` behind a `parking_lot::RwLock`. The lock is never held
//! across an `.await`; `parking_lot` locks are non-poisoning, so a
//! panicking writer leaves the map usable.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use credex_core::Timestamp;

use crate::registry::Registry;

struct Entry<V> {
    value: V,
    expires_at: Timestamp,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Timestamp) -> bool {
        !self.expires_at.is_passed_at(now.as_datetime())
    }
}

/// Thread-safe, cloneable in-memory registry. Clones share the same map.
pub struct MemoryRegistry<V> {
    entries: Arc<RwLock<HashMap<String, Entry<V>>>>,
}

impl<V> Clone for MemoryRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> MemoryRegistry<V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<V> std::fmt::Debug for MemoryRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRegistry")
            .field("len", &self.entries.read().len())
            .finish()
    }
}

impl<V> Default for MemoryRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> Registry<V> for MemoryRegistry<V> {
    fn get(&self, key: &str, now: Timestamp) -> Option<V> {
        self.entries
            .read()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone())
    }

    fn put(&self, key: String, value: V, expires_at: Timestamp) -> Option<V> {
        self.entries
            .write()
            .insert(key, Entry { value, expires_at })
            .map(|e| e.value)
    }

    fn update(&self, key: &str, now: Timestamp, f: &mut dyn FnMut(&mut V)) -> Option<V> {
        let mut guard = self.entries.write();
        let entry = guard.get_mut(key).filter(|e| e.is_live(now))?;
        f(&mut entry.value);
        Some(entry.value.clone())
    }

    fn delete(&self, key: &str) -> Option<V> {
        self.entries.write().remove(key).map(|e| e.value)
    }

    fn evict_expired(&self, now: Timestamp) -> usize {
        let mut guard = self.entries.write();
        let before = guard.len();
        guard.retain(|_, e| e.is_live(now));
        before - guard.len()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
