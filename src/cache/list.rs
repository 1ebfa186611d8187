//! Recency List Module
//!
//! Doubly linked recency order threaded through slot indices.

use std::marker::PhantomData;

use crate::cache::entry::Entry;
use crate::cache::slots::SlotStorage;

// == Order List ==
/// Tracks access order for LRU eviction.
///
/// The links live inside the entries themselves; this struct only keeps the
/// endpoints:
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderList {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl OrderList {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of the most recently used entry.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Slot of the least recently used entry.
    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Front ==
    /// Links the entry in slot `idx` in as the new head.
    ///
    /// The entry must not already be linked.
    pub fn push_front<K, V, S: SlotStorage<K, V>>(&mut self, slots: &mut S, idx: usize) {
        let old_head = self.head;
        match slots.get_mut(idx) {
            Some(entry) => {
                entry.prev = None;
                entry.next = old_head;
            }
            None => return,
        }

        match old_head {
            Some(head) => {
                if let Some(head_entry) = slots.get_mut(head) {
                    head_entry.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }

        self.head = Some(idx);
        self.len += 1;
    }

    // == Unlink ==
    /// Detaches the entry in slot `idx`, patching its neighbours and the
    /// endpoints. The entry itself stays in its slot.
    pub fn unlink<K, V, S: SlotStorage<K, V>>(&mut self, slots: &mut S, idx: usize) {
        let (prev, next) = match slots.get_mut(idx) {
            Some(entry) => (entry.prev.take(), entry.next.take()),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(prev_entry) = slots.get_mut(p) {
                    prev_entry.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(n) => {
                if let Some(next_entry) = slots.get_mut(n) {
                    next_entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        self.len -= 1;
    }

    // == Move To Front ==
    /// Marks the entry in slot `idx` as most recently used.
    pub fn move_to_front<K, V, S: SlotStorage<K, V>>(&mut self, slots: &mut S, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(slots, idx);
        self.push_front(slots, idx);
    }

    /// Forgets every link. The caller is responsible for clearing the slots.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // == Iter ==
    /// Walks the entries from most to least recently used.
    pub fn iter<'a, K, V, S: SlotStorage<K, V>>(&self, slots: &'a S) -> Iter<'a, K, V, S> {
        Iter {
            slots,
            cursor: self.head,
            remaining: self.len,
            _entries: PhantomData,
        }
    }
}

/// Iterator over list entries, MRU first.
pub struct Iter<'a, K, V, S> {
    slots: &'a S,
    cursor: Option<usize>,
    remaining: usize,
    _entries: PhantomData<fn() -> (K, V)>,
}

impl<'a, K: 'a, V: 'a, S: SlotStorage<K, V>> Iterator for Iter<'a, K, V, S> {
    type Item = (usize, &'a Entry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = self.cursor?;
        let entry = self.slots.get(idx)?;
        self.cursor = entry.next;
        self.remaining -= 1;
        Some((idx, entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
