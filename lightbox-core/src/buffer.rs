use bytes::{Bytes, BytesMut};

/// Receive accumulator for terminator-delimited text frames.
///
/// Request frames on this protocol are not length-prefixed; they end with a
/// literal terminator followed by a fixed-width checksum. The decoder
/// therefore needs to scan buffered bytes for the terminator, which requires
/// a contiguous view. This buffer accumulates transport reads and hands the
/// decoder exact frame prefixes.
///
/// # Use Cases
///
/// - The host's request decoder pulling one command frame per read cycle
/// - The client reader assembling a status line of unknown length
#[derive(Debug, Default)]
pub struct ScanBuffer {
    buf: BytesMut,
}

impl ScanBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a transport read to the accumulator.
    #[inline]
    pub fn push(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Byte offset of the first occurrence of `needle`, if buffered.
    #[must_use]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || needle.len() > self.buf.len() {
            return None;
        }
        self.buf
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Split off and return the first `n` buffered bytes.
    ///
    /// Returns `None` if fewer than `n` bytes are available; the buffer is
    /// left untouched in that case.
    pub fn take(&mut self, n: usize) -> Option<Bytes> {
        if n > self.buf.len() {
            return None;
        }
        Some(self.buf.split_to(n).freeze())
    }

    /// View the buffered bytes without consuming them.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Drop everything buffered. Used when a connection is abandoned
    /// mid-frame.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
