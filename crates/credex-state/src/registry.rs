//! The keyed registry abstraction.

use credex_core::Timestamp;

/// A concurrency-safe keyed store with per-entry expiry.
///
/// An entry whose `expires_at` is strictly before `now` is treated as absent.
/// Implementations must make [`Registry::update`] atomic with respect to
/// every other operation on the same key.
pub trait Registry<V>: Send + Sync + std::fmt::Debug {
    /// The live value under `key`.
    fn get(&self, key: &str, now: Timestamp) -> Option<V>;

    /// Insert or overwrite `key`, returning the previous value.
    fn put(&self, key: String, value: V, expires_at: Timestamp) -> Option<V>;

    /// Mutate the live value under `key` in place and return the updated
    /// value, or `None` if there is no live entry.
    fn update(&self, key: &str, now: Timestamp, f: &mut dyn FnMut(&mut V)) -> Option<V>;

    /// Remove `key`, returning its value.
    fn delete(&self, key: &str) -> Option<V>;

    /// Remove every entry expired at `now`, returning how many were removed.
    fn evict_expired(&self, now: Timestamp) -> usize;

    /// Number of stored entries, expired or not.
    fn len(&self) -> usize;

    /// Whether the registry holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
