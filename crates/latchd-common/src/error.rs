//! Error types for latchd
//!
//! Engine outcomes (acquired/conflict/not-found/invalid) are status values,
//! not errors; `LatchError` covers the faults around the engine: malformed
//! wire input and connection I/O failures.

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum LatchError {
    #[error("ERR {0}")]
    Protocol(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LatchError {
    /// Protocol error with a message destined for a wire error reply.
    pub fn protocol(message: impl Into<String>) -> Self {
        LatchError::Protocol(message.into())
    }
}
