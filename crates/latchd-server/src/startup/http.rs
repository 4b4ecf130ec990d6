//! HTTP server setup

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};
use latchd_core::LockService;

use crate::{api, config::HttpConfig};

/// Creates and binds the HTTP server.
///
/// Serves the lock API (`/lock/<key>`) and the liveness endpoint. HTTP
/// keep-alive applies to non-blocking operations; a connection-scoped
/// acquire keeps its request (and therefore its connection) open until the
/// lock is torn down.
pub fn http_server(service: LockService, config: &HttpConfig) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(service.clone()))
            .service(api::route::routes())
    })
    .bind((config.bind_address.clone(), config.port))?
    .run())
}
