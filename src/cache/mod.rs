//! Cache Module
//!
//! Provides an in-memory LRU cache with lazy TTL expiration and two slot
//! storage backends.

mod clock;
mod entry;
mod list;
mod slots;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{Entry, Expiry};
pub use slots::{FixedSlots, GrowableSlots, SlotStorage};
pub use stats::CacheStats;
pub use store::{DisposeHook, FixedLruCache, LruCache};
