//! Transport-supplied connection liveness and control handle
//!
//! The engine never performs socket I/O. Each transport builds a
//! [`ConnectionHandle`] per request and drives its disconnect side from
//! whatever liveness signal that transport has (a read probe on an idle
//! socket, a dropped request future). The engine drives the close side
//! when a connection-scoped lock is released by a third party.

use tokio_util::sync::CancellationToken;

/// Liveness and control handle for one peer connection.
///
/// Both signals are one-shot, broadcast and level-triggered: observers that
/// subscribe after the fact resolve immediately.
#[derive(Clone, Debug, Default)]
pub struct ConnectionHandle {
    disconnect: CancellationToken,
    close_request: CancellationToken,
}

impl ConnectionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the transport once it observes peer loss.
    pub fn notify_disconnect(&self) {
        self.disconnect.cancel();
    }

    /// Resolves once the peer is known to be gone.
    pub async fn disconnected(&self) {
        self.disconnect.cancelled().await;
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnect.is_cancelled()
    }

    /// Called by the engine to ask the transport to terminate this
    /// connection (connection-scoped lock released by a third party).
    pub fn request_close(&self) {
        self.close_request.cancel();
    }

    /// Resolves once the engine has requested a forcible close.
    pub async fn close_requested(&self) {
        self.close_request.cancelled().await;
    }

    pub fn is_close_requested(&self) -> bool {
        self.close_request.is_cancelled()
    }
}
