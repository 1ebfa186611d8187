//! Cache Entry Module
//!
//! Defines a single cached record together with its recency links.

// == Expiry ==
/// Absolute expiry of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The entry never expires
    Never,
    /// The entry expires at this timestamp (milliseconds)
    At(u64),
}

impl Expiry {
    // == From TTL ==
    /// Computes the expiry for an entry written at `now_ms`.
    ///
    /// A TTL of 0 disables expiry.
    pub fn from_ttl(now_ms: u64, ttl_ms: u64) -> Self {
        if ttl_ms == 0 {
            Expiry::Never
        } else {
            Expiry::At(now_ms.saturating_add(ttl_ms))
        }
    }

    // == Is Expired ==
    /// Checks whether the expiry has been reached.
    ///
    /// Boundary condition: an entry whose expiry equals `now_ms` is expired.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self {
            Expiry::At(at) => now_ms >= *at,
            Expiry::Never => false,
        }
    }

    /// Remaining lifetime in milliseconds, `None` for entries that never expire.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self {
            Expiry::At(at) => Some(at.saturating_sub(now_ms)),
            Expiry::Never => None,
        }
    }
}

// == Cache Entry ==
/// A cached record stored in a slot.
///
/// `prev` points towards the most recently used end of the list, `next`
/// towards the least recently used end. Both are slot indices.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
    pub expiry: Expiry,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: K, value: V, expiry: Expiry) -> Self {
        Self {
            key,
            value,
            expiry,
            prev: None,
            next: None,
        }
    }

    /// Unpacks the entry into its key and value.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}
