//! Cache Store Module
//!
//! Main cache engine combining a key index, the recency list, slot storage
//! and lazy TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::{Entry, Expiry};
use crate::cache::list::OrderList;
use crate::cache::slots::{FixedSlots, GrowableSlots, SlotStorage};
use crate::cache::stats::CacheStats;
use crate::config::Config;
use crate::error::Result;

/// Callback run with the key and value of every entry that leaves the cache
/// through `delete`, eviction or expiry.
pub type DisposeHook<K, V> = Box<dyn FnMut(K, V) + Send>;

/// Cache backed by the preallocated slot table.
pub type FixedLruCache<K, V> = LruCache<K, V, FixedSlots<K, V>>;

// == LRU Cache ==
/// Bounded key-value cache with LRU eviction and optional TTL.
///
/// Every operation is O(1) amortised except [`prune`](Self::prune),
/// [`keys`](Self::keys) and [`iter`](Self::iter), which walk all entries.
///
/// The cache does no internal locking. Share it across threads by wrapping the
/// whole cache in a lock.
pub struct LruCache<K, V, S = GrowableSlots<K, V>> {
    /// Key to slot lookup
    index: HashMap<K, usize>,
    /// Recency order over occupied slots
    list: OrderList,
    /// Entry storage
    slots: S,
    /// Maximum number of entries, 0 = unbounded
    max: usize,
    /// TTL in milliseconds applied on every write, 0 = no expiry
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
    on_dispose: Option<DisposeHook<K, V>>,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V, GrowableSlots<K, V>>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a cache backed by a growable arena.
    ///
    /// Supports unbounded caches (`max == 0`).
    pub fn new(config: Config) -> Result<Self> {
        Self::with_storage(config)
    }
}

impl<K, V> LruCache<K, V, FixedSlots<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache whose `max` slots are allocated up front.
    ///
    /// Fails with [`ConfigError::ZeroCapacity`](crate::error::ConfigError::ZeroCapacity)
    /// when `max` is 0.
    pub fn fixed(config: Config) -> Result<Self> {
        Self::with_storage(config)
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: SlotStorage<K, V>,
{
    /// Creates a cache on any storage backend.
    pub fn with_storage(config: Config) -> Result<Self> {
        let slots = S::for_capacity(config.max)?;
        debug!(
            "Cache created: max={}, ttl={}ms",
            config.max, config.ttl_ms
        );

        Ok(Self {
            index: HashMap::new(),
            list: OrderList::new(),
            slots,
            max: config.max,
            ttl_ms: config.ttl_ms,
            clock: Arc::new(SystemClock::new()),
            on_dispose: None,
            stats: CacheStats::new(),
        })
    }

    // == Builder Hooks ==
    /// Installs the dispose hook.
    ///
    /// The hook runs synchronously inside `delete`, `evict`, `prune`, `get`
    /// (for expired entries) and `set` (for capacity evictions). It receives
    /// ownership of the removed key and value. `clear` does not call it.
    pub fn with_dispose<F>(mut self, hook: F) -> Self
    where
        F: FnMut(K, V) + Send + 'static,
    {
        self.on_dispose = Some(Box::new(hook));
        self
    }

    /// Replaces the timestamp source. Install it before writing entries:
    /// existing expiry stamps are not translated.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Has ==
    /// Returns true if `key` is indexed.
    ///
    /// No side effects and no expiry check: an expired entry that has not
    /// been reaped yet still counts.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Get ==
    /// Retrieves a value and marks it most recently used.
    ///
    /// An expired entry is removed (the dispose hook runs) and counted as a
    /// miss. Reading never extends the entry's expiry.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.stats.record_miss();
                trace!("Cache miss");
                return None;
            }
        };

        let now = self.clock.now_ms();
        let expired = self
            .slots
            .get(idx)
            .map_or(true, |entry| entry.expiry.is_expired(now));

        if expired {
            self.stats.record_miss();
            self.stats.record_expiration();
            if let Some((key, value)) = self.remove_slot(idx) {
                debug!(slot = idx, "Expired entry removed on read");
                self.dispose(key, value);
            }
            return None;
        }

        self.promote(idx);
        self.stats.record_hit();
        trace!(slot = idx, "Cache hit");
        self.slots.get(idx).map(|entry| &entry.value)
    }

    // == Peek ==
    /// Returns a live value without touching recency or reaping.
    ///
    /// Expired entries read as absent but stay in place.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        self.index
            .get(key)
            .and_then(|&idx| self.slots.get(idx))
            .filter(|entry| !entry.expiry.is_expired(now))
            .map(|entry| &entry.value)
    }

    // == Set ==
    /// Stores a key-value pair and marks it most recently used.
    ///
    /// Writing an existing key replaces its value and restarts its TTL.
    /// Writing a new key into a full cache first evicts the least recently
    /// used entry, dispose hook included.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    pub fn set(&mut self, key: K, value: V) {
        let expiry = Expiry::from_ttl(self.clock.now_ms(), self.ttl_ms);

        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.slots.get_mut(idx) {
                entry.value = value;
                entry.expiry = expiry;
            }
            self.promote(idx);
            return;
        }

        if self.max > 0 && self.index.len() >= self.max {
            self.evict();
        }

        let idx = match self.allocate(Entry::new(key.clone(), value, expiry)) {
            Some(idx) => idx,
            None => {
                warn!("Storage rejected write with no entries left to evict");
                return;
            }
        };
        self.list.push_front(&mut self.slots, idx);
        self.index.insert(key, idx);
    }

    // == Delete ==
    /// Removes an entry by key, running the dispose hook.
    ///
    /// Returns false (and does nothing) when the key is absent.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => return false,
        };

        match self.remove_slot(idx) {
            Some((key, value)) => {
                self.dispose(key, value);
                true
            }
            None => false,
        }
    }

    // == Evict ==
    /// Removes the least recently used entry regardless of capacity.
    ///
    /// Returns false when the cache is empty.
    pub fn evict(&mut self) -> bool {
        let idx = match self.list.tail() {
            Some(idx) => idx,
            None => return false,
        };

        match self.remove_slot(idx) {
            Some((key, value)) => {
                self.stats.record_eviction();
                debug!(slot = idx, "Evicted least recently used entry");
                self.dispose(key, value);
                true
            }
            None => false,
        }
    }

    // == Prune ==
    /// Removes every expired entry.
    ///
    /// Unlike reading every key with [`get`](Self::get), surviving entries
    /// keep their recency position and are not counted as hits. Returns the
    /// number of entries removed.
    pub fn prune(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<usize> = self
            .list
            .iter(&self.slots)
            .filter(|(_, entry)| entry.expiry.is_expired(now))
            .map(|(idx, _)| idx)
            .collect();

        let mut removed = 0;
        for idx in expired {
            if let Some((key, value)) = self.remove_slot(idx) {
                self.stats.record_expiration();
                self.dispose(key, value);
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("Pruned {} expired entries", removed);
        }
        removed
    }

    // == Clear ==
    /// Drops every entry at once.
    ///
    /// This is a bulk reset, not an eviction: the dispose hook is not called.
    /// Statistics are kept.
    pub fn clear(&mut self) {
        let dropped = self.index.len();
        self.index.clear();
        self.list.clear();
        self.slots.clear();
        debug!("Cleared {} entries", dropped);
    }

    // == Keys ==
    /// Snapshot of all indexed keys, expired ones included.
    ///
    /// The order is the index's enumeration order, not recency order; use
    /// [`iter`](Self::iter) for the latter.
    pub fn keys(&self) -> Vec<K> {
        self.index.keys().cloned().collect()
    }

    /// Iterates entries from most to least recently used without touching
    /// recency.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list
            .iter(&self.slots)
            .map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Key of the most recently used entry.
    pub fn peek_mru(&self) -> Option<&K> {
        self.list
            .head()
            .and_then(|idx| self.slots.get(idx))
            .map(|entry| &entry.key)
    }

    /// Key of the least recently used entry, the next eviction candidate.
    pub fn peek_lru(&self) -> Option<&K> {
        self.list
            .tail()
            .and_then(|idx| self.slots.get(idx))
            .map(|entry| &entry.key)
    }

    /// Absolute expiry of `key`, if indexed.
    pub fn expires_at<Q>(&self, key: &Q) -> Option<Expiry>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .and_then(|&idx| self.slots.get(idx))
            .map(|entry| entry.expiry)
    }

    // == Length ==
    /// Returns the number of entries, expired-but-unreaped ones included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Configured capacity bound, 0 = unbounded.
    pub fn capacity(&self) -> usize {
        self.max
    }

    /// Configured TTL in milliseconds, 0 = no expiry.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    // == Reset Stats ==
    /// Zeroes every counter. Entries are untouched.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::new();
    }

    // == Internals ==
    /// Moves an entry to the head without rewriting its value or expiry.
    fn promote(&mut self, idx: usize) {
        self.list.move_to_front(&mut self.slots, idx);
    }

    /// Places an entry in storage, evicting from the LRU end while the backend
    /// has no free slot. Returns `None`, dropping the entry, once nothing is
    /// left to evict.
    fn allocate(&mut self, entry: Entry<K, V>) -> Option<usize> {
        let mut pending = entry;
        loop {
            match self.slots.insert(pending) {
                Ok(idx) => return Some(idx),
                Err(rejected) => {
                    if !self.evict() {
                        return None;
                    }
                    pending = rejected;
                }
            }
        }
    }

    /// Unlinks and frees a slot, dropping its key from the index.
    fn remove_slot(&mut self, idx: usize) -> Option<(K, V)> {
        self.list.unlink(&mut self.slots, idx);
        let entry = self.slots.remove(idx)?;
        self.index.remove(&entry.key);
        Some(entry.into_pair())
    }

    fn dispose(&mut self, key: K, value: V) {
        if let Some(hook) = self.on_dispose.as_mut() {
            hook(key, value);
        }
    }

    /// Asserts the structural invariants of index, list and storage.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let walked: Vec<usize> = self.list.iter(&self.slots).map(|(idx, _)| idx).collect();

        assert_eq!(walked.len(), self.list.len(), "list length mismatch");
        assert_eq!(walked.len(), self.index.len(), "index size mismatch");
        assert_eq!(walked.len(), self.slots.occupied(), "slot count mismatch");
        assert_eq!(self.list.head(), walked.first().copied(), "head mismatch");
        assert_eq!(self.list.tail(), walked.last().copied(), "tail mismatch");
        if self.max > 0 {
            assert!(self.index.len() <= self.max, "capacity exceeded");
        }

        for (pos, idx) in walked.iter().enumerate() {
            let entry = self.slots.get(*idx).expect("walked slot is occupied");
            let expected_prev = pos.checked_sub(1).map(|p| walked[p]);
            assert_eq!(entry.prev, expected_prev, "broken prev link");
            assert_eq!(entry.next, walked.get(pos + 1).copied(), "broken next link");
            assert_eq!(self.index.get(&entry.key), Some(idx), "orphaned entry");
        }
    }
}

impl<K, V, S> fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max", &self.max)
            .field("ttl_ms", &self.ttl_ms)
            .field("len", &self.index.len())
            .field("stats", &self.stats)
            .finish()
    }
}
