//! Latchd Server - transports and bootstrap
//!
//! Hosts the two wire transports over the `latchd-core` engine:
//! - an HTTP API (`GET`/`DELETE`/`PATCH /lock/<key>` plus `/health`)
//! - a Redis-protocol-compatible TCP command server
//!
//! plus environment-driven configuration, logging setup and graceful
//! shutdown handling.

pub mod api;
pub mod config;
pub mod resp;
pub mod startup;

pub use config::Configuration;
