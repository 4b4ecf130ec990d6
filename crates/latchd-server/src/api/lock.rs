//! Lock endpoint handlers
//!
//! - `GET /lock/<key>` — acquire (query: `ttl`, `lock`, `wait`)
//! - `DELETE /lock/<key>` — release
//! - `PATCH /lock/<key>` — refresh (query: `ttl`)
//!
//! Responses carry the engine status code and an empty body. A
//! connection-scoped acquire does not complete until the lock is torn
//! down, so lock ownership and the open request connection are one and
//! the same on this transport.

use actix_web::{HttpRequest, HttpResponse, delete, get, http::StatusCode, patch, web};
use latchd_core::{ConnectionHandle, LockService, RequestContext, Status};

use super::model::LockParams;

fn to_http_code(status: Status) -> StatusCode {
    match status {
        Status::Acquired => StatusCode::OK,
        Status::Conflict => StatusCode::CONFLICT,
        Status::NotFound => StatusCode::NOT_FOUND,
        Status::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Turns the drop of an abandoned handler future (the way actix surfaces a
/// client disconnect) into a disconnect event for the engine.
struct DisconnectGuard(ConnectionHandle);

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.0.notify_disconnect();
    }
}

#[get("/lock/{key:.*}")]
pub async fn acquire(
    req: HttpRequest,
    key: web::Path<String>,
    service: web::Data<LockService>,
) -> HttpResponse {
    let params = LockParams::parse(req.query_string());
    let conn = ConnectionHandle::new();
    let _guard = DisconnectGuard(conn.clone());

    let ctx = RequestContext {
        key: key.into_inner(),
        ttl: params.ttl,
        hold: params.hold,
        wait: params.wait,
        conn: conn.clone(),
    };
    let status = service.acquire(ctx).await;

    let mut builder = HttpResponse::build(to_http_code(status));
    if conn.is_close_requested() {
        // Connection-scoped lock released by a third party: tear the
        // owning connection down with the response
        builder.force_close();
    }
    builder.finish()
}

#[delete("/lock/{key:.*}")]
pub async fn release(key: web::Path<String>, service: web::Data<LockService>) -> HttpResponse {
    HttpResponse::new(to_http_code(service.release(&key)))
}

#[patch("/lock/{key:.*}")]
pub async fn refresh(
    req: HttpRequest,
    key: web::Path<String>,
    service: web::Data<LockService>,
) -> HttpResponse {
    let params = LockParams::parse(req.query_string());
    HttpResponse::new(to_http_code(service.refresh(&key, params.ttl)))
}
