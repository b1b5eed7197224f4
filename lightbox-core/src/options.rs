//! Link configuration options
//!
//! This module provides tuning for one half-duplex protocol link: read/write
//! timeouts, the inter-line pacing delay, and buffer limits.

use std::time::Duration;

/// Default listen-read timeout (30 seconds).
///
/// An unbounded listen read lets a hung client stall the host forever, so
/// the default is finite; waiting forever is an explicit opt-in.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pacing delay between successive framed response lines (1 second).
///
/// A deliberate throttle for slow or line-buffered transports, not an
/// error-recovery mechanism.
pub const DEFAULT_LINE_PACING: Duration = Duration::from_secs(1);

/// Default read buffer size (1KB)
///
/// Requests are short command lines; one serial-sized chunk is plenty.
pub const DEFAULT_READ_BUF_SIZE: usize = 1024;

/// Default maximum request frame length (1KB)
///
/// A request growing past this without a terminator is malformed.
pub const DEFAULT_MAX_REQUEST_LEN: usize = 1024;

/// Configuration options for one protocol link.
///
/// # Timeout semantics
///
/// - `None`: block indefinitely
/// - `Some(Duration::ZERO)`: non-blocking (fail immediately if not ready)
/// - `Some(duration)`: wait up to duration
///
/// # Examples
///
/// ```
/// use lightbox_core::options::LinkOptions;
/// use std::time::Duration;
///
/// let opts = LinkOptions::default()
///     .with_recv_timeout(Some(Duration::from_secs(5)))
///     .with_line_pacing(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Listen-read timeout. Finite by default; see [`DEFAULT_RECV_TIMEOUT`].
    pub recv_timeout: Option<Duration>,

    /// Write timeout for response lines.
    /// - `None`: block indefinitely (default)
    pub send_timeout: Option<Duration>,

    /// Minimum delay enforced between successive framed response lines.
    pub line_pacing: Duration,

    /// Size of the chunk requested from the transport per read.
    pub read_buffer_size: usize,

    /// Maximum bytes a single request frame may span before it is
    /// rejected as malformed.
    pub max_request_len: usize,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            recv_timeout: Some(DEFAULT_RECV_TIMEOUT),
            send_timeout: None, // Block indefinitely
            line_pacing: DEFAULT_LINE_PACING,
            read_buffer_size: DEFAULT_READ_BUF_SIZE,
            max_request_len: DEFAULT_MAX_REQUEST_LEN,
        }
    }
}

impl LinkOptions {
    /// Create new link options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listen-read timeout. `None` waits forever.
    #[must_use]
    pub fn with_recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recv_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the inter-line pacing delay. `Duration::ZERO` disables pacing
    /// (useful in tests).
    #[must_use]
    pub fn with_line_pacing(mut self, pacing: Duration) -> Self {
        self.line_pacing = pacing;
        self
    }

    /// Set the per-read chunk size.
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the maximum request frame length.
    #[must_use]
    pub fn with_max_request_len(mut self, len: usize) -> Self {
        self.max_request_len = len;
        self
    }
}
