//! Lease supervision for TTL-bounded locks
//!
//! One detached task per leased entry, started once at creation. It owns
//! the entry's refresh receiver and is the only actor that expires the
//! lease; explicit release and connection teardown reach it through the
//! entry's close signal. Every select arm terminates or re-arms, so no
//! supervisor survives its entry.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::debug;

use crate::registry::{LockEntry, LockRegistry};

/// Start the supervisor for a freshly leased entry. A second call for the
/// same entry finds the refresh receiver already taken and does nothing.
pub(crate) fn spawn(
    registry: Arc<LockRegistry>,
    key: String,
    entry: Arc<LockEntry>,
    initial_ttl_ms: u64,
) {
    let Some(refresh_rx) = entry.take_refresh_rx() else {
        return;
    };
    tokio::spawn(run(registry, key, entry, initial_ttl_ms, refresh_rx));
}

async fn run(
    registry: Arc<LockRegistry>,
    key: String,
    entry: Arc<LockEntry>,
    mut ttl_ms: u64,
    mut refresh_rx: mpsc::Receiver<u64>,
) {
    loop {
        tokio::select! {
            _ = entry.closed() => {
                // Destroyed externally (release or holder teardown)
                debug!(key = %key, "lease supervisor stopped");
                return;
            }
            next = refresh_rx.recv() => {
                // The sender lives in the entry this task holds, so recv
                // cannot fail while the loop runs; re-arm from zero.
                if let Some(ms) = next {
                    ttl_ms = ms;
                    debug!(key = %key, ttl_ms, "lease re-armed");
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(ttl_ms)) => {
                registry.destroy(&key);
                debug!(key = %key, ttl_ms, "lease expired");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_lease_expires_after_ttl() {
        let registry = Arc::new(LockRegistry::new());
        let (created, entry) = registry.try_create("k");
        assert!(created);
        spawn(registry.clone(), "k".to_string(), entry, 50);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(registry.exists("k"));
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!registry.exists("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_restarts_timer_from_zero() {
        let registry = Arc::new(LockRegistry::new());
        let (_, entry) = registry.try_create("k");
        spawn(registry.clone(), "k".to_string(), entry, 50);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(registry.refresh("k", 300));

        // Original deadline (t=50) must not fire
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(registry.exists("k"));

        // New deadline is t=30+300=330
        tokio::time::sleep(Duration::from_millis(240)).await;
        assert!(registry.exists("k"));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!registry.exists("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_supervisor_without_expiry() {
        let registry = Arc::new(LockRegistry::new());
        let (_, entry) = registry.try_create("k");
        spawn(registry.clone(), "k".to_string(), entry, 50);

        // Explicit destroy wins the race; the timer path never runs
        assert!(registry.destroy("k"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!registry.exists("k"));

        // The key is free for a new, independent lease
        let (created, entry) = registry.try_create("k");
        assert!(created);
        spawn(registry.clone(), "k".to_string(), entry, 50);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(registry.exists("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_expires_immediately() {
        let registry = Arc::new(LockRegistry::new());
        let (_, entry) = registry.try_create("k");
        spawn(registry.clone(), "k".to_string(), entry, 0);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!registry.exists("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_spawn_is_inert() {
        let registry = Arc::new(LockRegistry::new());
        let (_, entry) = registry.try_create("k");
        spawn(registry.clone(), "k".to_string(), entry.clone(), 500);
        // Receiver already taken; this one must not arm a 10ms expiry
        spawn(registry.clone(), "k".to_string(), entry, 10);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(registry.exists("k"));
        tokio::time::sleep(Duration::from_millis(450)).await;
        assert!(!registry.exists("k"));
    }
}
