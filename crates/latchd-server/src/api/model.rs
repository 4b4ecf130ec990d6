//! Query parameter model for the lock endpoints
//!
//! The flags are presence-based (`?lock`, `?wait`, with or without a
//! value), which serde-backed extractors cannot express; the raw query
//! string is parsed instead.

use latchd_common::{LOCK_PARAM, TTL_PARAM, WAIT_PARAM};

/// Parsed `/lock/<key>` query parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LockParams {
    /// `Some` when a `ttl` parameter is present; unparsable values map to 0
    pub ttl: Option<u64>,
    /// Connection-scoped hold requested
    pub hold: bool,
    /// Block until the key becomes available
    pub wait: bool,
}

impl LockParams {
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                TTL_PARAM => params.ttl = Some(value.parse().unwrap_or(0)),
                LOCK_PARAM => params.hold = true,
                WAIT_PARAM => params.wait = true,
                _ => {}
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_query() {
        let params = LockParams::parse("");
        assert_eq!(params, LockParams::default());
    }

    #[test]
    fn test_parse_ttl_value() {
        let params = LockParams::parse("ttl=1500");
        assert_eq!(params.ttl, Some(1500));
        assert!(!params.hold);
        assert!(!params.wait);
    }

    #[test]
    fn test_parse_unparsable_ttl_is_zero() {
        assert_eq!(LockParams::parse("ttl=abc").ttl, Some(0));
        assert_eq!(LockParams::parse("ttl").ttl, Some(0));
        assert_eq!(LockParams::parse("ttl=-5").ttl, Some(0));
    }

    #[test]
    fn test_parse_presence_flags() {
        let params = LockParams::parse("lock&wait");
        assert!(params.hold);
        assert!(params.wait);
        assert_eq!(params.ttl, None);

        // Values on the flags are irrelevant, presence decides
        let params = LockParams::parse("lock=0&wait=");
        assert!(params.hold);
        assert!(params.wait);
    }

    #[test]
    fn test_parse_combined() {
        let params = LockParams::parse("ttl=100&wait&other=x");
        assert_eq!(params.ttl, Some(100));
        assert!(!params.hold);
        assert!(params.wait);
    }
}
