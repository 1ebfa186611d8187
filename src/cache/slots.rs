//! Slot Storage Module
//!
//! Owns every cache entry. Entries are addressed by slot index, which lets the
//! recency list link entries without shared mutable references.
//!
//! Two backends are provided:
//! - [`GrowableSlots`]: an arena that grows on demand and recycles released
//!   slots. Works for unbounded caches.
//! - [`FixedSlots`]: `max` slots allocated up front with a freelist stack.
//!   Inserts never allocate.

use crate::cache::entry::Entry;
use crate::error::{ConfigError, Result};

// == Slot Storage Trait ==
/// Storage strategy for cache entries.
pub trait SlotStorage<K, V> {
    /// Creates storage for a cache bounded to `max` entries (0 = unbounded).
    fn for_capacity(max: usize) -> Result<Self>
    where
        Self: Sized;

    /// Places `entry` in a free slot and returns its index.
    ///
    /// Hands the entry back when no slot is available. An empty store must
    /// accept at least one entry; the cache gives up on a write it cannot
    /// place even after evicting everything.
    fn insert(&mut self, entry: Entry<K, V>) -> std::result::Result<usize, Entry<K, V>>;

    /// Vacates slot `idx`, returning the entry it held.
    fn remove(&mut self, idx: usize) -> Option<Entry<K, V>>;

    /// Entry in slot `idx`, or `None` for a vacant or out-of-range slot.
    fn get(&self, idx: usize) -> Option<&Entry<K, V>>;

    /// Mutable access to the entry in slot `idx`.
    fn get_mut(&mut self, idx: usize) -> Option<&mut Entry<K, V>>;

    /// Drops every entry and makes all slots available again.
    fn clear(&mut self);

    /// Number of occupied slots.
    fn occupied(&self) -> usize;
}

// == Growable Slots ==
/// Arena storage that grows on demand.
///
/// Nothing is reserved up front, `max` is only a bound. Released slots are
/// pushed on a freelist and reused before the arena grows.
#[derive(Debug)]
pub struct GrowableSlots<K, V> {
    entries: Vec<Option<Entry<K, V>>>,
    free: Vec<usize>,
    occupied: usize,
}

impl<K, V> SlotStorage<K, V> for GrowableSlots<K, V> {
    fn for_capacity(_max: usize) -> Result<Self> {
        Ok(Self {
            entries: Vec::new(),
            free: Vec::new(),
            occupied: 0,
        })
    }

    fn insert(&mut self, entry: Entry<K, V>) -> std::result::Result<usize, Entry<K, V>> {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.entries[idx] = Some(entry);
                idx
            }
            None => {
                self.entries.push(Some(entry));
                self.entries.len() - 1
            }
        };
        self.occupied += 1;
        Ok(idx)
    }

    fn remove(&mut self, idx: usize) -> Option<Entry<K, V>> {
        let entry = self.entries.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.occupied -= 1;
        Some(entry)
    }

    fn get(&self, idx: usize) -> Option<&Entry<K, V>> {
        self.entries.get(idx)?.as_ref()
    }

    fn get_mut(&mut self, idx: usize) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(idx)?.as_mut()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
        self.occupied = 0;
    }

    fn occupied(&self) -> usize {
        self.occupied
    }
}

// == Fixed Slots ==
/// Preallocated slot table with a freelist stack.
///
/// The freelist starts out holding every index in reverse order, so the
/// lowest free index is always handed out first on a fresh table. A vacated
/// slot is reset to `None` (no key, no value, no expiry, no links) before its
/// index is pushed back.
#[derive(Debug)]
pub struct FixedSlots<K, V> {
    slots: Box<[Option<Entry<K, V>>]>,
    free: Vec<usize>,
}

impl<K, V> FixedSlots<K, V> {
    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of unused slots.
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    fn reset_freelist(&mut self) {
        self.free.clear();
        self.free.extend((0..self.slots.len()).rev());
    }
}

impl<K, V> SlotStorage<K, V> for FixedSlots<K, V> {
    fn for_capacity(max: usize) -> Result<Self> {
        if max == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(max)
            .map_err(|_| ConfigError::CapacityTooLarge(max))?;
        slots.resize_with(max, || None);

        let mut free = Vec::new();
        free.try_reserve_exact(max)
            .map_err(|_| ConfigError::CapacityTooLarge(max))?;

        let mut storage = Self {
            slots: slots.into_boxed_slice(),
            free,
        };
        storage.reset_freelist();
        Ok(storage)
    }

    fn insert(&mut self, entry: Entry<K, V>) -> std::result::Result<usize, Entry<K, V>> {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                Ok(idx)
            }
            None => Err(entry),
        }
    }

    fn remove(&mut self, idx: usize) -> Option<Entry<K, V>> {
        let entry = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(entry)
    }

    fn get(&self, idx: usize) -> Option<&Entry<K, V>> {
        self.slots.get(idx)?.as_ref()
    }

    fn get_mut(&mut self, idx: usize) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(idx)?.as_mut()
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.reset_freelist();
    }

    fn occupied(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
