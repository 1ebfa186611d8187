//! Tiny LRU - A bounded in-memory cache
//!
//! Provides least-recently-used eviction with optional per-entry TTL. Expiry is
//! lazy: stale entries are reaped when read or when [`LruCache::prune`] runs.
//!
//! ```
//! use tiny_lru::{Config, LruCache};
//!
//! let mut cache: LruCache<&str, u32> = LruCache::new(Config::new(2, 0))?;
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.set("c", 3); // evicts "a"
//!
//! assert!(!cache.has("a"));
//! assert_eq!(cache.get("b"), Some(&2));
//! # Ok::<(), tiny_lru::ConfigError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, Expiry, FixedLruCache, LruCache};
pub use config::Config;
pub use error::ConfigError;
pub use tasks::spawn_prune_task;
