//! Prune Task
//!
//! Background task that periodically reaps expired entries from a shared cache.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{LruCache, SlotStorage};

/// Spawns a task that calls [`LruCache::prune`] every `interval`.
///
/// The cache does no locking of its own, so it is shared through an
/// `Arc<Mutex<_>>` and the task holds the lock only for the duration of a
/// single prune. Dispose hooks run on the task.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `interval` - Time between prune runs
///
/// # Returns
/// A JoinHandle for the spawned task. Abort it to stop pruning.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Mutex::new(LruCache::new(Config::new(1000, 5_000))?));
/// let handle = spawn_prune_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_prune_task<K, V, S>(
    cache: Arc<Mutex<LruCache<K, V, S>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
    S: SlotStorage<K, V> + Send + 'static,
{
    tokio::spawn(async move {
        info!("Starting prune task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = cache.lock().await;
                guard.prune()
            };

            if removed > 0 {
                info!("Prune: removed {} expired entries", removed);
            } else {
                debug!("Prune: no expired entries found");
            }
        }
    })
}
