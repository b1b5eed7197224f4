//! Timeout utilities for I/O operations
//!
//! Provides timeout wrappers for async read/write operations using compio's
//! timeout support. All wrappers share the same semantics:
//!
//! * `None`: block indefinitely (no timeout)
//! * `Some(Duration::ZERO)`: non-blocking (return immediately if not ready)
//! * `Some(duration)`: wait up to duration
//!
//! On expiry the wrapped operation yields `io::ErrorKind::TimedOut`.

use compio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use compio::time::timeout;
use std::io;
use std::time::Duration;

/// Execute a single read with a timeout.
///
/// Returns the usual compio `BufResult` carrying the byte count; `Ok(0)`
/// inside it means EOF.
pub async fn read_with_timeout<S, B>(
    stream: &mut S,
    buf: B,
    duration: Option<Duration>,
) -> io::Result<compio::buf::BufResult<usize, B>>
where
    S: AsyncRead + Unpin,
    B: compio::buf::IoBufMut,
{
    match duration {
        None => Ok(stream.read(buf).await),
        Some(d) if d.is_zero() => Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "Non-blocking mode not yet implemented",
        )),
        Some(d) => match timeout(d, stream.read(buf)).await {
            Ok(result) => Ok(result),
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "Read operation timed out",
            )),
        },
    }
}

/// Execute an async read_exact operation with a timeout.
///
/// Reads exactly the full buffer or returns an error.
pub async fn read_exact_with_timeout<S, B>(
    stream: &mut S,
    buf: B,
    duration: Option<Duration>,
) -> io::Result<compio::buf::BufResult<(), B>>
where
    S: AsyncRead + Unpin,
    B: compio::buf::IoBufMut,
{
    match duration {
        None => Ok(stream.read_exact(buf).await),
        Some(d) if d.is_zero() => Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "Non-blocking mode not yet implemented",
        )),
        Some(d) => match timeout(d, stream.read_exact(buf)).await {
            Ok(result) => Ok(result),
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "Read operation timed out",
            )),
        },
    }
}

/// Execute an async write_all operation with a timeout.
///
/// Writes the entire buffer or returns an error.
pub async fn write_all_with_timeout<S, B>(
    stream: &mut S,
    buf: B,
    duration: Option<Duration>,
) -> io::Result<compio::buf::BufResult<(), B>>
where
    S: AsyncWrite + Unpin,
    B: compio::buf::IoBuf,
{
    match duration {
        None => Ok(stream.write_all(buf).await),
        Some(d) if d.is_zero() => Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "Non-blocking mode not yet implemented",
        )),
        Some(d) => match timeout(d, stream.write_all(buf)).await {
            Ok(result) => Ok(result),
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "Write operation timed out",
            )),
        },
    }
}
