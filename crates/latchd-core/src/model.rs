//! Request and status types shared by the engine and the transports

use crate::connection::ConnectionHandle;

/// Outcome of an engine operation, carried back to the transports as a
/// numeric status on both wires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Resource acquired, released or refreshed (context-dependent success)
    Acquired,
    /// Resource is held and the caller did not ask to wait
    Conflict,
    /// Release/refresh target does not exist
    NotFound,
    /// Caller error: refresh without a ttl parameter
    InvalidRequest,
}

impl Status {
    /// Numeric code used by both transports.
    pub fn code(self) -> u16 {
        match self {
            Status::Acquired => 200,
            Status::Conflict => 409,
            Status::NotFound => 404,
            Status::InvalidRequest => 422,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Uniform engine input produced by every transport adapter.
///
/// `ttl` is `Some` when the caller supplied a ttl parameter at all;
/// an unparsable value maps to `Some(0)` rather than `None`.
#[derive(Clone)]
pub struct RequestContext {
    /// Resource key; opaque, compared by exact equality
    pub key: String,
    /// Lease duration in milliseconds, when the request carries one
    pub ttl: Option<u64>,
    /// Hold the lock for the lifetime of the requesting connection
    pub hold: bool,
    /// Block until the key becomes available instead of failing fast
    pub wait: bool,
    /// Liveness/control handle for the requesting connection
    pub conn: ConnectionHandle,
}

impl RequestContext {
    /// Context for a plain operation with no flags set.
    pub fn new(key: impl Into<String>, conn: ConnectionHandle) -> Self {
        Self {
            key: key.into(),
            ttl: None,
            hold: false,
            wait: false,
            conn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Acquired.code(), 200);
        assert_eq!(Status::Conflict.code(), 409);
        assert_eq!(Status::NotFound.code(), 404);
        assert_eq!(Status::InvalidRequest.code(), 422);
    }

    #[test]
    fn test_status_display_is_numeric() {
        assert_eq!(Status::Conflict.to_string(), "409");
    }

    #[test]
    fn test_request_context_defaults() {
        let ctx = RequestContext::new("orders/42", ConnectionHandle::new());
        assert_eq!(ctx.key, "orders/42");
        assert_eq!(ctx.ttl, None);
        assert!(!ctx.hold);
        assert!(!ctx.wait);
    }
}
