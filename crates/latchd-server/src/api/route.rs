//! HTTP routing configuration
//!
//! Routes:
//! - GET /lock/{key} - Acquire a lock (query: ttl, lock, wait)
//! - DELETE /lock/{key} - Release a lock
//! - PATCH /lock/{key} - Refresh a lease (query: ttl)
//! - GET /health - Liveness probe

use actix_web::{Scope, web};

use super::{health, lock};

pub fn routes() -> Scope {
    web::scope("")
        .service(lock::acquire)
        .service(lock::release)
        .service(lock::refresh)
        .service(health::health)
}
