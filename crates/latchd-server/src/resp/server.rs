//! RESP command server
//!
//! Commands:
//! - `GET key [ttl] [lock] [wait]` — acquire; argument 2 is the ttl in
//!   milliseconds when present, argument 3 `"1"` requests a
//!   connection-scoped hold, argument 4 `"1"` requests waiting
//! - `DELETE key` — release
//! - `REFRESH key [ttl]` — refresh a lease
//!
//! Replies are bulk strings carrying the numeric engine status; malformed
//! input produces `-ERR` replies without touching engine state.

use std::net::SocketAddr;

use tokio::{
    io::{AsyncRead, AsyncWriteExt, BufWriter},
    net::{TcpListener, TcpStream},
};
use tracing::{debug, error, info};

use latchd_common::LatchError;
use latchd_core::{ConnectionHandle, LockService, RequestContext, Status};

use crate::config::RespConfig;
use crate::resp::codec::{self, CommandReader};

/// RESP server for the lock service
pub struct RespServer {
    config: RespConfig,
    service: LockService,
}

impl RespServer {
    pub fn new(config: RespConfig, service: LockService) -> Self {
        Self { config, service }
    }

    /// Bind and start serving. Returns the bound address (useful when the
    /// configured port is 0).
    pub async fn start(&self) -> anyhow::Result<SocketAddr> {
        let addr: SocketAddr =
            format!("{}:{}", self.config.bind_address, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        info!("RESP server listening on {}", local_addr);

        let service = self.service.clone();
        tokio::spawn(accept_loop(listener, service));
        Ok(local_addr)
    }
}

async fn accept_loop(listener: TcpListener, service: LockService) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let service = service.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(service, stream).await {
                        debug!(%peer, "connection closed: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("RESP accept error: {}", e);
            }
        }
    }
}

async fn handle_connection(service: LockService, stream: TcpStream) -> std::io::Result<()> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = CommandReader::new(read_half);
    let mut writer = BufWriter::new(write_half);

    loop {
        let args = match reader.read_command().await {
            Ok(Some(args)) => args,
            Ok(None) => return Ok(()),
            Err(LatchError::Io(e)) => return Err(e),
            Err(LatchError::Protocol(message)) => {
                codec::write_error(&mut writer, &message).await?;
                writer.flush().await?;
                continue;
            }
        };

        let conn = ConnectionHandle::new();
        match dispatch(&service, &mut reader, &conn, &args).await {
            Ok(status) => {
                codec::write_bulk(&mut writer, &status.code().to_string()).await?;
                writer.flush().await?;
            }
            Err(LatchError::Io(e)) => return Err(e),
            Err(LatchError::Protocol(message)) => {
                codec::write_error(&mut writer, &message).await?;
                writer.flush().await?;
                continue;
            }
        }

        // A connection-scoped hold released by a third party tears the
        // owning connection down; a peer observed gone has nothing to read
        if conn.is_close_requested() || conn.is_disconnected() {
            return Ok(());
        }
    }
}

async fn dispatch<R: AsyncRead + Unpin>(
    service: &LockService,
    reader: &mut CommandReader<R>,
    conn: &ConnectionHandle,
    args: &[String],
) -> Result<Status, LatchError> {
    if args.len() < 2 {
        return Err(LatchError::protocol("no key"));
    }
    match args[0].to_uppercase().as_str() {
        "GET" => {
            let ctx = build_context(args, conn.clone())?;
            if !ctx.wait && !ctx.hold {
                return Ok(service.acquire(ctx).await);
            }
            // Watch the idle read half while the engine call may block;
            // anything arriving (or the stream failing) counts as peer loss
            let probe = async {
                reader.probe_disconnect().await;
                conn.notify_disconnect();
                std::future::pending::<Status>().await
            };
            let status = tokio::select! {
                biased;
                status = service.acquire(ctx) => status,
                status = probe => status,
            };
            Ok(status)
        }
        "DELETE" => Ok(service.release(&args[1])),
        "REFRESH" => Ok(service.refresh(&args[1], parse_ttl(args)?)),
        _ => Err(LatchError::protocol("unknown command")),
    }
}

fn parse_ttl(args: &[String]) -> Result<Option<u64>, LatchError> {
    if args.len() < 3 {
        return Ok(None);
    }
    args[2]
        .parse::<u64>()
        .map(Some)
        .map_err(|_| LatchError::protocol("invalid ttl"))
}

fn build_context(args: &[String], conn: ConnectionHandle) -> Result<RequestContext, LatchError> {
    Ok(RequestContext {
        key: args[1].clone(),
        ttl: parse_ttl(args)?,
        hold: args.len() > 3 && args[3] == "1",
        wait: args.len() > 4 && args[4] == "1",
        conn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_ttl_absent() {
        assert_eq!(parse_ttl(&args(&["GET", "k"])).unwrap(), None);
    }

    #[test]
    fn test_parse_ttl_present() {
        assert_eq!(parse_ttl(&args(&["GET", "k", "250"])).unwrap(), Some(250));
    }

    #[test]
    fn test_parse_ttl_invalid() {
        assert!(parse_ttl(&args(&["GET", "k", "soon"])).is_err());
    }

    #[test]
    fn test_build_context_flags() {
        let ctx = build_context(
            &args(&["GET", "k", "100", "1", "1"]),
            ConnectionHandle::new(),
        )
        .unwrap();
        assert_eq!(ctx.key, "k");
        assert_eq!(ctx.ttl, Some(100));
        assert!(ctx.hold);
        assert!(ctx.wait);
    }

    #[test]
    fn test_build_context_flags_off() {
        let ctx = build_context(&args(&["GET", "k", "100", "0", "0"]), ConnectionHandle::new())
            .unwrap();
        assert!(!ctx.hold);
        assert!(!ctx.wait);

        let ctx = build_context(&args(&["GET", "k"]), ConnectionHandle::new()).unwrap();
        assert_eq!(ctx.ttl, None);
        assert!(!ctx.hold);
        assert!(!ctx.wait);
    }
}
