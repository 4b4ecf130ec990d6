//! Startup modules: logging, HTTP server setup, graceful shutdown

pub mod http;
pub mod logging;
pub mod shutdown;

pub use http::http_server;
pub use logging::init_logging;
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
