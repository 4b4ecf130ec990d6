//! Redis-protocol-compatible command transport

pub mod codec;
pub mod server;

pub use server::RespServer;
