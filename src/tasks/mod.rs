//! Background Tasks Module
//!
//! Opt-in maintenance for caches shared behind a lock. The cache itself never
//! starts a task; expiry stays lazy unless the caller spawns one of these.
//!
//! # Tasks
//! - Prune: reaps expired entries at a fixed interval

mod prune;

pub use prune::spawn_prune_task;
