/// Lightbox Error Types
///
/// Error handling for host-level operations. Wire-level protocol errors
/// (framing, checksum) live in `lightbox-wire` and are mapped to reply
/// codes at the host boundary rather than surfacing here.
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Lightbox host operations
#[derive(Error, Debug)]
pub enum LightboxError {
    /// IO error on the underlying transport
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid startup configuration (aborts startup, never a running session)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Endpoint string could not be parsed or is unsupported here
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    /// The listen read exceeded the configured timeout
    #[error("Read timed out after {0:?}")]
    Timeout(Duration),

    /// Peer closed the connection
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// The shutdown token fired between requests
    #[error("Shutdown requested")]
    Shutdown,
}

/// Result type alias for Lightbox operations
pub type Result<T> = std::result::Result<T, LightboxError>;

impl LightboxError {
    /// Create a configuration error with a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an endpoint error with a message
    pub fn endpoint(msg: impl Into<String>) -> Self {
        Self::Endpoint(msg.into())
    }

    /// True for errors that invalidate the whole server, not just one
    /// connection. The accept loop keeps serving on everything else.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Endpoint(_))
    }

    /// True when the connection ended in an orderly way (peer hangup,
    /// idle timeout, shutdown) rather than a transport fault.
    #[must_use]
    pub const fn is_orderly_end(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::Timeout(_) | Self::Shutdown
        )
    }
}
