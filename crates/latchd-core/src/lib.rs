//! Latchd Core - Lock coordination engine
//!
//! This crate provides the in-memory authority for named advisory locks:
//! - Sharded lock registry with per-key mutual exclusion
//! - Acquire / Release / Refresh operations with wait-retry semantics
//! - Lease (TTL) supervision with refresh re-arming
//! - Connection-liveness-driven automatic release
//!
//! Transports translate their wire input into a [`RequestContext`] and map
//! the returned [`Status`] back onto the wire; the engine itself never
//! touches a socket. Peer liveness reaches the engine through the
//! transport-supplied [`ConnectionHandle`].

pub mod connection;
mod lease;
pub mod model;
pub mod registry;
pub mod service;

// Re-export commonly used types
pub use connection::ConnectionHandle;
pub use model::{RequestContext, Status};
pub use registry::{LockEntry, LockRegistry};
pub use service::LockService;
