//! Environment-driven server configuration
//!
//! Every section has defaults suitable for a container deployment and an
//! environment override, read once at startup.

use std::path::PathBuf;

/// HTTP transport bind configuration
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Address to bind the HTTP server
    pub bind_address: String,
    /// Port to bind the HTTP server
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

impl HttpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("LATCHD_HTTP_ADDRESS").unwrap_or(defaults.bind_address),
            port: std::env::var("LATCHD_HTTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// RESP (Redis protocol) transport bind configuration
#[derive(Clone, Debug)]
pub struct RespConfig {
    /// Address to bind the RESP server
    pub bind_address: String,
    /// Port to bind the RESP server
    pub port: u16,
}

impl Default for RespConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 6379,
        }
    }
}

impl RespConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("LATCHD_RESP_ADDRESS").unwrap_or(defaults.bind_address),
            port: std::env::var("LATCHD_RESP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Directory for the rolling log file; console-only when unset
    pub log_dir: Option<PathBuf>,
    /// Default filter directive when `LATCHD_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            filter: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_dir: std::env::var("LATCHD_LOG_DIR").ok().map(PathBuf::from),
            filter: std::env::var("LATCHD_LOG").unwrap_or(defaults.filter),
        }
    }
}

/// Complete server configuration
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub http: HttpConfig,
    pub resp: RespConfig,
    pub logging: LoggingConfig,
}

impl Configuration {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            http: HttpConfig::from_env(),
            resp: RespConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 80);
    }

    #[test]
    fn test_resp_config_default() {
        let config = RespConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 6379);
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.log_dir.is_none());
        assert_eq!(config.filter, "info");
    }
}
