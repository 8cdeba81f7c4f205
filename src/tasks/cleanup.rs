//! TTL Cleanup Task
//!
//! Background task that periodically evicts expired snapshots and drops idle
//! rate limit windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::market::SnapshotCache;
use crate::ratelimit::RateGovernor;

/// Spawns a background task that periodically sweeps the snapshot cache and
/// the rate governor.
///
/// Each run takes the cache write lock to remove expired snapshots, then the
/// governor write lock to forget clients with no requests left in their
/// window. The locks are never held together.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.market.cache().clone(), state.governor.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: SnapshotCache,
    governor: Arc<RwLock<RateGovernor>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup();
            let pruned = governor.write().await.prune();

            if removed > 0 || pruned > 0 {
                info!(
                    "Cleanup: removed {} expired snapshots, pruned {} idle clients",
                    removed, pruned
                );
            } else {
                debug!("Cleanup: nothing to remove");
            }
        }
    })
}
