use std::collections::HashMap;

use super::storage::MultiBufferStorage;
use super::Identify;

/// Opaque key naming one shard population inside a [`ShardStore`].
///
/// Keys are minted by the store owner (typically one per selection or
/// session) and passed into `generate` each frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StorageKey(u64);

impl StorageKey {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Owner-held home for multi-buffer shard storage.
///
/// A [`MultiBufferShapeCache`](super::MultiBufferShapeCache) may be
/// reconstructed by its owner on any frame; the store is what persists. The
/// cache only ever borrows it during `generate` and the shape operations,
/// and entries live until [`destroy`](Self::destroy) is called.
pub struct ShardStore<S: Identify> {
    entries: HashMap<StorageKey, MultiBufferStorage<S>>,
}

impl<S: Identify + Clone> ShardStore<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    #[inline]
    pub fn contains(&self, key: StorageKey) -> bool {
        self.entries.contains_key(&key)
    }

    #[inline]
    pub fn get(&self, key: StorageKey) -> Option<&MultiBufferStorage<S>> {
        self.entries.get(&key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: StorageKey) -> Option<&mut MultiBufferStorage<S>> {
        self.entries.get_mut(&key)
    }

    /// Creates storage for `key` if absent. Returns `true` when a new entry
    /// was created (the caller runs its one-time init hook on that signal).
    pub fn ensure(&mut self, key: StorageKey, num_buffers: usize) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, MultiBufferStorage::new(num_buffers));
        true
    }

    /// Drops the storage for `key`. Returns `false` if it did not exist.
    /// Snapshots already held by consumers remain valid.
    pub fn destroy(&mut self, key: StorageKey) -> bool {
        self.entries.remove(&key).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Identify + Clone> Default for ShardStore<S> {
    fn default() -> Self {
        Self::new()
    }
}
