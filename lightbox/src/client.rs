//! The album client: the reader side of the protocol contract.
//!
//! The response shape is part of the wire contract, so the reader lives
//! next to the host and derives every size from the same constants. A
//! command exchange is:
//!
//! 1. Write one framed request.
//! 2. Read the status line. Under half-duplex exactly one frame is in
//!    flight, so the reader accumulates until the buffered bytes verify as
//!    one frame.
//! 3. For `ls`/`get` with code 200, read the continuation with a single
//!    **exact-size** read of `continuation_wire_len(N)` bytes, where `N` is
//!    the count the status line declared. No other arithmetic is allowed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use compio::buf::BufResult;
use compio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use lightbox_core::buffer::ScanBuffer;
use lightbox_core::error::{LightboxError, Result};
use lightbox_core::options::LinkOptions;
use lightbox_core::timeout::{read_exact_with_timeout, read_with_timeout, write_all_with_timeout};
use lightbox_wire::checksum::CHECKSUM_LEN;
use lightbox_wire::codes::ReplyCode;
use lightbox_wire::frame::{self, REQUEST_TERMINATOR};
use lightbox_wire::reply::{continuation_wire_len, declared_bytes, parse_line, ParsedLine};

/// A status line as the client saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    pub code: ReplyCode,
    pub message: String,
}

impl StatusReply {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.code, ReplyCode::Ok)
    }
}

/// Outcome of a bulk command (`ls`, `get`): the status line plus the
/// continuation payload when the status was 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub status: StatusReply,
    pub payload: Option<String>,
}

impl Transfer {
    /// Base64-decode a `get` payload back into file bytes.
    #[must_use]
    pub fn decode_file(&self) -> Option<Vec<u8>> {
        let payload = self.payload.as_ref()?;
        BASE64.decode(payload.as_bytes()).ok()
    }
}

/// Client endpoint for one connection.
pub struct AlbumClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream: S,
    options: LinkOptions,
}

impl<S> AlbumClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self::with_options(stream, LinkOptions::default())
    }

    #[must_use]
    pub fn with_options(stream: S, options: LinkOptions) -> Self {
        Self { stream, options }
    }

    /// Liveness probe.
    pub async fn hello(&mut self) -> Result<StatusReply> {
        self.request_status("hello").await
    }

    /// Authenticate this connection.
    pub async fn auth(&mut self, user: &str, password: &str) -> Result<StatusReply> {
        self.request_status(&format!("auth {user} {password}")).await
    }

    /// Current directory.
    pub async fn pwd(&mut self) -> Result<StatusReply> {
        self.request_status("pwd").await
    }

    /// Change directory (`~` returns to the sandbox root).
    pub async fn cd(&mut self, path: &str) -> Result<StatusReply> {
        self.request_status(&format!("cd {path}")).await
    }

    /// End the session; the connection stays usable for a fresh `auth`.
    pub async fn quit(&mut self) -> Result<StatusReply> {
        self.request_status("quit").await
    }

    /// List a directory (the cursor's own directory when `path` is `None`).
    pub async fn ls(&mut self, path: Option<&str>) -> Result<Transfer> {
        let text = match path {
            Some(path) => format!("ls {path}"),
            None => "ls".to_string(),
        };
        self.transfer(&text).await
    }

    /// Download a file as its base64 payload.
    pub async fn get(&mut self, name: &str) -> Result<Transfer> {
        self.transfer(&format!("get {name}")).await
    }

    /// Single-line exchange: request out, status line back.
    async fn request_status(&mut self, text: &str) -> Result<StatusReply> {
        self.send_request(text).await?;
        self.read_status().await
    }

    /// Two-step exchange: status line, then the exact-size continuation
    /// read when the status declared a payload.
    async fn transfer(&mut self, text: &str) -> Result<Transfer> {
        self.send_request(text).await?;
        let status = self.read_status().await?;
        if !status.is_ok() {
            return Ok(Transfer {
                status,
                payload: None,
            });
        }

        let declared = declared_bytes(&status.message)
            .ok_or_else(|| protocol_error("status line declares no byte count"))?;
        let payload = self.read_continuation(declared).await?;
        Ok(Transfer {
            status,
            payload: Some(payload),
        })
    }

    async fn send_request(&mut self, text: &str) -> Result<()> {
        debug!("[CLIENT] Request: {:?}", text);
        let wire = frame::encode_request(text);
        let BufResult(result, _) =
            write_all_with_timeout(&mut self.stream, wire.to_vec(), self.options.send_timeout)
                .await?;
        result?;
        Ok(())
    }

    /// Accumulate transport reads until the buffer verifies as one frame.
    ///
    /// A reply line always ends `". "` + 4 checksum bytes, and half-duplex
    /// guarantees nothing follows it until we write again, so "the buffer
    /// is exactly one valid frame" is an unambiguous stop condition.
    async fn read_status(&mut self) -> Result<StatusReply> {
        let mut buf = ScanBuffer::with_capacity(self.options.read_buffer_size);
        loop {
            let chunk = vec![0u8; self.options.read_buffer_size];
            let read =
                read_with_timeout(&mut self.stream, chunk, self.options.recv_timeout).await;
            let BufResult(result, chunk) = match read {
                Ok(done) => done,
                Err(err) => return Err(self.classify_read_error(err)),
            };
            let n = result?;
            if n == 0 {
                return Err(LightboxError::ConnectionClosed);
            }
            buf.push(&chunk[..n]);

            let len = buf.len();
            let terminated = len >= REQUEST_TERMINATOR.len() + CHECKSUM_LEN
                && &buf.as_slice()[len - CHECKSUM_LEN - 2..len - CHECKSUM_LEN]
                    == REQUEST_TERMINATOR;
            if !terminated {
                continue;
            }
            let Ok(payload) = frame::decode_frame(buf.as_slice()) else {
                continue;
            };

            let text = std::str::from_utf8(payload)
                .map_err(|_| protocol_error("reply line is not valid UTF-8"))?;
            trace!("[CLIENT] Status line: {:?}", text);
            return match parse_line(text) {
                Ok(ParsedLine::Status { code, message }) => Ok(StatusReply { code, message }),
                Ok(ParsedLine::Continuation { .. }) => {
                    Err(protocol_error("continuation line arrived before a status"))
                }
                Err(err) => Err(protocol_error(&err.to_string())),
            };
        }
    }

    /// The crux read: exactly `continuation_wire_len(declared)` bytes.
    async fn read_continuation(&mut self, declared: usize) -> Result<String> {
        let wire_len = continuation_wire_len(declared);
        trace!(
            "[CLIENT] Reading continuation: {} payload bytes, {} wire bytes",
            declared,
            wire_len
        );

        let buf = vec![0u8; wire_len];
        let read =
            read_exact_with_timeout(&mut self.stream, buf, self.options.recv_timeout).await;
        let BufResult(result, buf) = match read {
            Ok(done) => done,
            Err(err) => return Err(self.classify_read_error(err)),
        };
        result?;

        let payload = frame::decode_frame(&buf)
            .map_err(|err| protocol_error(&err.to_string()))?;
        let text = std::str::from_utf8(payload)
            .map_err(|_| protocol_error("continuation payload is not valid UTF-8"))?;
        match parse_line(text) {
            Ok(ParsedLine::Continuation { payload }) if payload.len() == declared => Ok(payload),
            Ok(ParsedLine::Continuation { payload }) => Err(protocol_error(&format!(
                "continuation carried {} bytes, status declared {}",
                payload.len(),
                declared
            ))),
            Ok(ParsedLine::Status { .. }) => {
                Err(protocol_error("status line arrived where payload was due"))
            }
            Err(err) => Err(protocol_error(&err.to_string())),
        }
    }

    fn classify_read_error(&self, err: std::io::Error) -> LightboxError {
        if err.kind() == std::io::ErrorKind::TimedOut {
            return LightboxError::Timeout(self.options.recv_timeout.unwrap_or_default());
        }
        LightboxError::Io(err)
    }
}

fn protocol_error(msg: &str) -> LightboxError {
    LightboxError::Io(std::io::Error::other(msg.to_string()))
}
