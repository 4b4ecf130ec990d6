//! Engine operations: Acquire, Release, Refresh
//!
//! Each operation takes the uniform request representation produced by the
//! transports and returns a [`Status`]. Contention outcomes are status
//! values, never errors. Long-lived side effects (lease timers, holder
//! tasks) run detached but are owned by the entry lifetime: every one of
//! them terminates when the entry is destroyed.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::debug;

use crate::{
    connection::ConnectionHandle,
    lease,
    model::{RequestContext, Status},
    registry::{LockEntry, LockRegistry},
};

/// Lock coordination engine over a shared registry.
#[derive(Clone)]
pub struct LockService {
    registry: Arc<LockRegistry>,
}

impl LockService {
    pub fn new(registry: Arc<LockRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<LockRegistry> {
        &self.registry
    }

    /// Acquire the key named by `ctx`.
    ///
    /// - free key + ttl: lease created, returns immediately
    /// - free key + hold: blocks until the entry is destroyed by a
    ///   third-party release (the peer connection is then asked to close)
    ///   or by loss of the peer itself
    /// - free key, no flags: held until an explicit release
    /// - held key + wait: blocks until a release wakes the retry loop, then
    ///   races the other waiters; a caller whose own connection dies while
    ///   waiting abandons the wait (the returned status is never seen by
    ///   the dead peer)
    /// - held key, no wait: `Conflict`
    pub async fn acquire(&self, ctx: RequestContext) -> Status {
        loop {
            let (created, entry) = self.registry.try_create(&ctx.key);
            if created {
                if let Some(ttl_ms) = ctx.ttl {
                    lease::spawn(self.registry.clone(), ctx.key.clone(), entry, ttl_ms);
                    debug!(key = %ctx.key, ttl_ms, "lease acquired");
                    return Status::Acquired;
                }
                if ctx.hold {
                    debug!(key = %ctx.key, "connection-scoped lock acquired");
                    let done = self.spawn_holder(ctx.key.clone(), entry, ctx.conn.clone());
                    // The holder owns all cleanup, so a caller dropped by
                    // its transport changes nothing here.
                    let _ = done.await;
                    return Status::Acquired;
                }
                debug!(key = %ctx.key, "lock acquired");
                return Status::Acquired;
            }
            if !ctx.wait {
                return Status::Conflict;
            }
            tokio::select! {
                _ = entry.released() => {
                    // Holder gone; race the other woken waiters for the key
                }
                _ = ctx.conn.disconnected() => {
                    debug!(key = %ctx.key, "wait abandoned, peer disconnected");
                    return Status::Acquired;
                }
            }
        }
    }

    /// Destroy the entry for `key`, waking its waiters and stopping its
    /// supervising task.
    pub fn release(&self, key: &str) -> Status {
        if self.registry.destroy(key) {
            debug!(key, "lock released");
            Status::Acquired
        } else {
            Status::NotFound
        }
    }

    /// Deliver a new ttl to the key's lease supervisor. A request without a
    /// ttl parameter is rejected before the registry is consulted.
    pub fn refresh(&self, key: &str, ttl: Option<u64>) -> Status {
        let Some(ttl_ms) = ttl else {
            return Status::InvalidRequest;
        };
        if self.registry.refresh(key, ttl_ms) {
            debug!(key, ttl_ms, "lease refresh delivered");
            Status::Acquired
        } else {
            Status::NotFound
        }
    }

    /// Task holding a connection-scoped lock: a third-party release asks
    /// the owning connection to close; peer loss destroys the entry.
    fn spawn_holder(
        &self,
        key: String,
        entry: Arc<LockEntry>,
        conn: ConnectionHandle,
    ) -> oneshot::Receiver<()> {
        let (done_tx, done_rx) = oneshot::channel();
        let registry = self.registry.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = entry.closed() => {
                    conn.request_close();
                    debug!(key = %key, "connection-scoped lock released externally");
                }
                _ = conn.disconnected() => {
                    registry.destroy(&key);
                    debug!(key = %key, "connection-scoped lock dropped with peer");
                }
            }
            let _ = done_tx.send(());
        });
        done_rx
    }
}
