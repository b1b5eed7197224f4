//! XOR fold checksum.
//!
//! The checksum is the bitwise XOR of every byte in the payload, a value in
//! `[0, 255]`, transmitted as a fixed-width 4-byte little-endian integer
//! (top 3 bytes always zero).
//!
//! This is a deliberately **weak, order-insensitive** checksum: it cannot
//! detect transpositions, reordering, or an even number of flips of the same
//! bit position across the stream. Peers depend on these exact semantics for
//! wire compatibility - do not upgrade it.

/// Width of the checksum trailer on the wire.
pub const CHECKSUM_LEN: usize = 4;

/// XOR of every byte in `data`.
#[inline]
#[must_use]
pub fn fold(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc ^ b)
}

/// The 4-byte little-endian trailer for `data`.
#[inline]
#[must_use]
pub fn trailer(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    u32::from(fold(data)).to_le_bytes()
}
