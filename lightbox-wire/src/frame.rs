use bytes::{Bytes, BytesMut};
use lightbox_core::buffer::ScanBuffer;
use thiserror::Error;

use crate::checksum::{self, CHECKSUM_LEN};

/// Literal that closes every request's command text. It is covered by the
/// checksum and must be present for the frame to parse at all.
pub const REQUEST_TERMINATOR: &[u8] = b". ";

/// Wire protocol errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Incomplete frame")]
    Incomplete,

    #[error("Checksum mismatch: asserted {asserted:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { asserted: u32, computed: u32 },

    #[error("Malformed frame: {0}")]
    Malformed(&'static str),

    #[error("Frame text is not valid UTF-8")]
    NonUtf8,

    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),
}

/// Result type alias for wire operations
pub type Result<T> = std::result::Result<T, WireError>;

/// Frame a payload: `payload || checksum(payload) as 4-byte little-endian`.
#[must_use]
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum::trailer(payload));
    out.freeze()
}

/// Deframe: split the trailing 4 bytes as the asserted checksum, recompute
/// over the remaining prefix, and succeed only if they match.
///
/// The payload is never partially trusted - on mismatch nothing of the
/// frame is returned.
pub fn decode_frame(wire: &[u8]) -> Result<&[u8]> {
    if wire.len() < CHECKSUM_LEN {
        return Err(WireError::Incomplete);
    }
    let (payload, tail) = wire.split_at(wire.len() - CHECKSUM_LEN);
    let asserted = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
    let computed = u32::from(checksum::fold(payload));
    if asserted != computed {
        return Err(WireError::ChecksumMismatch { asserted, computed });
    }
    Ok(payload)
}

/// Frame a request: appends the `". "` terminator to the command text, then
/// checksums the whole thing.
#[must_use]
pub fn encode_request(command_text: &str) -> Bytes {
    let mut payload = BytesMut::with_capacity(command_text.len() + REQUEST_TERMINATOR.len());
    payload.extend_from_slice(command_text.as_bytes());
    payload.extend_from_slice(REQUEST_TERMINATOR);
    encode_frame(&payload)
}

/// Stateful request decoder
///
/// Pulls one request frame at a time out of a [`ScanBuffer`] fed by
/// transport reads. Requests are terminator-delimited: the decoder scans for
/// the first `". "` and takes the 4 bytes after it as the asserted checksum.
///
/// Returns:
/// - `Ok(Some(text))` -> verified command text, terminator stripped
/// - `Ok(None)` -> need more data
/// - `Err` -> malformed or corrupt frame (the offending bytes are consumed
///   where possible; callers should clear the buffer before resuming)
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    max_frame_len: usize,
}

impl FrameDecoder {
    #[must_use]
    pub const fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }

    pub fn decode(&self, src: &mut ScanBuffer) -> Result<Option<String>> {
        let Some(at) = src.find(REQUEST_TERMINATOR) else {
            // No terminator yet. A request can't straddle the frame limit.
            if src.len() > self.max_frame_len {
                return Err(WireError::Malformed("no terminator within frame limit"));
            }
            return Ok(None);
        };

        let total = at + REQUEST_TERMINATOR.len() + CHECKSUM_LEN;
        if total > self.max_frame_len + CHECKSUM_LEN {
            return Err(WireError::Malformed("request exceeds frame limit"));
        }
        if src.len() < total {
            return Ok(None);
        }

        // Whole frame present: consume it even if verification fails below,
        // so the link can resync on the next request.
        let wire = match src.take(total) {
            Some(wire) => wire,
            None => return Ok(None),
        };

        let payload = decode_frame(&wire)?;
        let text = &payload[..payload.len() - REQUEST_TERMINATOR.len()];
        match std::str::from_utf8(text) {
            Ok(text) => Ok(Some(text.to_string())),
            Err(_) => Err(WireError::NonUtf8),
        }
    }
}
