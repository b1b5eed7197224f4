//! The album host: one half-duplex connection's serve loop.
//!
//! # Protocol State Machine
//!
//! The host is strictly serial:
//! - Block on the transport until one full request frame arrives
//! - Process it synchronously against the session gate and the vault
//! - Write every reply line, pacing between lines
//! - Repeat
//!
//! No request is retried by the host; recovery is always client-driven.
//! Every failure short of losing the transport produces exactly one
//! well-formed framed reply line, so the client's deframing logic sees a
//! consistent shape regardless of outcome.
//!
//! The listen read honors `LinkOptions::recv_timeout` (finite by default)
//! and the loop checks a [`ShutdownToken`] between requests, so neither a
//! hung client nor a stop request can wedge the host.

use compio::buf::BufResult;
use compio::io::{AsyncRead, AsyncWrite};
use smallvec::smallvec;
use tracing::{debug, trace, warn};

use lightbox_core::buffer::ScanBuffer;
use lightbox_core::error::{LightboxError, Result};
use lightbox_core::options::LinkOptions;
use lightbox_core::shutdown::ShutdownToken;
use lightbox_core::timeout::{read_with_timeout, write_all_with_timeout};
use lightbox_wire::auth::CredentialStore;
use lightbox_wire::codes::ReplyCode;
use lightbox_wire::command::Request;
use lightbox_wire::frame::{FrameDecoder, WireError};
use lightbox_wire::reply::ReplyLine;
use lightbox_wire::session::Gate;

use crate::handlers::{self, ReplyLines};
use crate::vault::PhotoVault;

/// What one listen cycle produced.
enum Inbound {
    /// A verified request's command text
    Text(String),
    /// A frame arrived but failed verification or parsing
    Bad(WireError),
    /// Peer closed the connection
    Closed,
}

/// Host endpoint for one connection.
///
/// Generic over the stream so a serial device handle and a `TcpStream`
/// serve identically; the transport is owned exclusively for the
/// connection's lifetime.
pub struct AlbumHost<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream: S,
    decoder: FrameDecoder,
    recv: ScanBuffer,
    options: LinkOptions,
    shutdown: ShutdownToken,
}

impl<S> AlbumHost<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    #[must_use]
    pub fn new(stream: S, options: LinkOptions, shutdown: ShutdownToken) -> Self {
        Self {
            stream,
            decoder: FrameDecoder::new(options.max_request_len),
            recv: ScanBuffer::with_capacity(options.read_buffer_size),
            options,
            shutdown,
        }
    }

    /// Serve the connection until the peer disconnects, the read times out,
    /// or shutdown is requested.
    ///
    /// Returns `Ok(())` on a clean peer disconnect. `quit` does not end the
    /// loop - it only drops the session, and the peer may `auth` again.
    ///
    /// # Errors
    ///
    /// - `LightboxError::Shutdown` when the token fired
    /// - `LightboxError::Timeout` when the listen read expired
    /// - `LightboxError::Io` on transport faults
    pub async fn serve<C>(&mut self, vault: &PhotoVault, credentials: &C) -> Result<()>
    where
        C: CredentialStore + ?Sized,
    {
        let mut gate = Gate::default();
        debug!("[HOST] Serving connection");

        loop {
            if self.shutdown.is_triggered() {
                debug!("[HOST] Shutdown requested, ending connection");
                return Err(LightboxError::Shutdown);
            }

            let lines: ReplyLines = match self.read_request().await? {
                Inbound::Closed => {
                    debug!("[HOST] Peer disconnected");
                    return Ok(());
                }
                Inbound::Bad(err) => {
                    warn!("[HOST] Rejected request frame: {}", err);
                    // Drop any buffered garbage so the link can resync.
                    self.recv.clear();
                    smallvec![ReplyLine::status(reply_code_for(&err))]
                }
                Inbound::Text(text) => {
                    trace!("[HOST] Request: {:?}", text);
                    match Request::parse(&text) {
                        Ok(request) => {
                            handlers::dispatch(&request, &mut gate, vault, credentials)
                                .await
                        }
                        Err(err) => {
                            warn!("[HOST] Unparseable request: {}", err);
                            smallvec![ReplyLine::status(ReplyCode::InvalidCommand)]
                        }
                    }
                }
            };

            self.send_reply(&lines).await?;
        }
    }

    /// Block until one request frame is decodable (or the link ends).
    async fn read_request(&mut self) -> Result<Inbound> {
        loop {
            match self.decoder.decode(&mut self.recv) {
                Ok(Some(text)) => return Ok(Inbound::Text(text)),
                Ok(None) => {}
                Err(err) => return Ok(Inbound::Bad(err)),
            }

            if self.read_raw().await? == 0 {
                return Ok(Inbound::Closed);
            }
        }
    }

    /// One transport read into the receive accumulator.
    ///
    /// Returns the byte count; 0 means EOF.
    async fn read_raw(&mut self) -> Result<usize> {
        let chunk = vec![0u8; self.options.read_buffer_size];
        let recv_timeout = self.options.recv_timeout;

        let read = read_with_timeout(&mut self.stream, chunk, recv_timeout).await;
        let BufResult(result, chunk) = match read {
            Ok(done) => done,
            Err(err) => return Err(self.classify_read_error(err)),
        };
        let n = result?;
        if n > 0 {
            self.recv.push(&chunk[..n]);
        }
        Ok(n)
    }

    /// A timed-out listen read ends the connection; if shutdown fired while
    /// we were blocked, report that instead.
    fn classify_read_error(&self, err: std::io::Error) -> LightboxError {
        if err.kind() == std::io::ErrorKind::TimedOut {
            if self.shutdown.is_triggered() {
                return LightboxError::Shutdown;
            }
            return LightboxError::Timeout(self.options.recv_timeout.unwrap_or_default());
        }
        LightboxError::Io(err)
    }

    /// The response assembler: frame and write each line in order, pacing
    /// between successive lines so a slow reader can keep up.
    async fn send_reply(&mut self, lines: &[ReplyLine]) -> Result<()> {
        for (index, line) in lines.iter().enumerate() {
            if index > 0 && !self.options.line_pacing.is_zero() {
                compio::time::sleep(self.options.line_pacing).await;
            }

            let wire = line.encode();
            trace!(
                "[HOST] Sending line {} of {} ({} wire bytes)",
                index + 1,
                lines.len(),
                wire.len()
            );
            let BufResult(result, _) =
                write_all_with_timeout(&mut self.stream, wire.to_vec(), self.options.send_timeout)
                    .await?;
            result?;
        }
        Ok(())
    }
}

/// Framing errors map onto the fixed code table: a failed checksum is 199,
/// every other malformation is 102.
const fn reply_code_for(err: &WireError) -> ReplyCode {
    match err {
        WireError::ChecksumMismatch { .. } => ReplyCode::ChecksumFailed,
        _ => ReplyCode::InvalidCommand,
    }
}
