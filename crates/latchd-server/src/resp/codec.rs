//! Incremental RESP command codec
//!
//! Reads commands as multibulk arrays of bulk strings (`*2\r\n$3\r\nGET...`)
//! or as inline, whitespace-separated lines (what redis-cli sends over a
//! pipe). Replies are bulk strings; protocol faults become `-ERR` error
//! replies at the call site.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use latchd_common::LatchError;

/// Upper bound on arguments per command frame
const MAX_ARGS: usize = 64;
/// Upper bound on a single bulk string payload
const MAX_BULK_LEN: usize = 64 * 1024;
/// Upper bound on an unterminated line before the frame is rejected
const MAX_LINE_LEN: usize = 64 * 1024;

/// Buffered command reader over one connection's read half.
pub struct CommandReader<R> {
    io: R,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> CommandReader<R> {
    pub fn new(io: R) -> Self {
        Self {
            io,
            buf: BytesMut::with_capacity(4096),
        }
    }

    /// Read the next command. `Ok(None)` on clean end of stream. Protocol
    /// errors discard the buffered input so the stream can resynchronize on
    /// whatever the peer sends next.
    pub async fn read_command(&mut self) -> Result<Option<Vec<String>>, LatchError> {
        loop {
            match self.try_parse() {
                Ok(Some(args)) => {
                    if !args.is_empty() {
                        return Ok(Some(args));
                    }
                    // bare newline, skip
                }
                Ok(None) => {
                    let n = self.io.read_buf(&mut self.buf).await?;
                    if n == 0 {
                        if self.buf.is_empty() {
                            return Ok(None);
                        }
                        self.buf.clear();
                        return Err(LatchError::protocol("unexpected end of stream"));
                    }
                }
                Err(e) => {
                    self.buf.clear();
                    return Err(e);
                }
            }
        }
    }

    /// Watch the idle connection while a blocking command is in flight.
    /// Any read outcome counts as peer disconnect: under normal protocol
    /// use nothing arrives between a command and its reply.
    pub async fn probe_disconnect(&mut self) {
        if !self.buf.is_empty() {
            return;
        }
        let _ = self.io.read_buf(&mut self.buf).await;
    }

    fn try_parse(&mut self) -> Result<Option<Vec<String>>, LatchError> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        if self.buf[0] == b'*' {
            self.parse_multibulk()
        } else {
            self.parse_inline()
        }
    }

    fn parse_inline(&mut self) -> Result<Option<Vec<String>>, LatchError> {
        let Some((line, consumed)) = line_at(&self.buf, 0) else {
            if self.buf.len() > MAX_LINE_LEN {
                return Err(LatchError::protocol("inline command too long"));
            }
            return Ok(None);
        };
        let text = String::from_utf8_lossy(line).into_owned();
        self.buf.advance(consumed);
        Ok(Some(text.split_whitespace().map(str::to_string).collect()))
    }

    fn parse_multibulk(&mut self) -> Result<Option<Vec<String>>, LatchError> {
        let buf = &self.buf[..];
        let Some((header, mut pos)) = line_at(buf, 0) else {
            if buf.len() > MAX_LINE_LEN {
                return Err(LatchError::protocol("multibulk header too long"));
            }
            return Ok(None);
        };
        let count = std::str::from_utf8(&header[1..])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| LatchError::protocol("invalid multibulk length"))?;
        if count > MAX_ARGS {
            return Err(LatchError::protocol("too many arguments"));
        }

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            let Some((len_line, after_len)) = line_at(buf, pos) else {
                return Ok(None);
            };
            if len_line.first() != Some(&b'$') {
                return Err(LatchError::protocol("expected bulk string"));
            }
            let len = std::str::from_utf8(&len_line[1..])
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .ok_or_else(|| LatchError::protocol("invalid bulk length"))?;
            if len > MAX_BULK_LEN {
                return Err(LatchError::protocol("bulk string too long"));
            }
            if buf.len() < after_len + len + 2 {
                return Ok(None);
            }
            if &buf[after_len + len..after_len + len + 2] != b"\r\n" {
                return Err(LatchError::protocol("malformed bulk string"));
            }
            args.push(String::from_utf8_lossy(&buf[after_len..after_len + len]).into_owned());
            pos = after_len + len + 2;
        }
        self.buf.advance(pos);
        Ok(Some(args))
    }
}

/// Next `\n`-terminated line starting at `pos`, with the terminator (and an
/// optional preceding `\r`) stripped; returns the line and the offset just
/// past it.
fn line_at(buf: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    let rel = buf[pos..].iter().position(|&b| b == b'\n')?;
    let end = pos + rel;
    let line = &buf[pos..end];
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    Some((line, end + 1))
}

/// Bulk string reply.
pub async fn write_bulk<W: AsyncWrite + Unpin>(writer: &mut W, data: &str) -> std::io::Result<()> {
    writer
        .write_all(format!("${}\r\n{}\r\n", data.len(), data).as_bytes())
        .await
}

/// `-ERR` error reply.
pub async fn write_error<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &str,
) -> std::io::Result<()> {
    writer
        .write_all(format!("-ERR {}\r\n", message).as_bytes())
        .await
}
