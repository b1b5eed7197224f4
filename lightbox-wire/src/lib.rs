//! # Lightbox Wire
//!
//! Sans-IO implementation of the Lightbox photo retrieval protocol: a
//! text-command, checksum-framed request/reply protocol for half-duplex
//! byte streams.
//!
//! ## Overview
//!
//! One protocol exchange looks like this on the wire:
//!
//! ```text
//! client -> host   "ls holidays. " <4 checksum bytes>
//! host   -> client "200 OK. 23 bytes. " <4 checksum bytes>
//! host   -> client "000 d-2019 f-beach.jpg. " <4 checksum bytes>
//! ```
//!
//! Every unit is a *frame*: ASCII/UTF-8 text followed by a 4-byte
//! little-endian XOR checksum over exactly the preceding text. Requests end
//! in the literal `". "` (covered by the checksum); responses are one status
//! line, optionally followed by a single continuation line (code `000`)
//! carrying bulk payload whose size the status line declared.
//!
//! ## Layers
//!
//! - [`checksum`]: the XOR fold and its 4-byte trailer
//! - [`frame`]: framing/deframing, plus a streaming request decoder
//! - [`codes`]: the closed reply-code table
//! - [`command`]: request parsing into a closed command enum
//! - [`session`]: the per-connection auth gate and navigation cursor
//! - [`reply`]: reply-line rendering and the continuation sizing contract
//! - [`auth`]: the credential-store seam
//!
//! All of this is pure state and bytes - no I/O. The `lightbox` crate owns
//! the transports.

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod checksum;
pub mod codes;
pub mod command;
pub mod frame;
pub mod reply;
pub mod session;

// Re-export commonly used types
pub use codes::ReplyCode;
pub use command::{CommandKind, Request};
pub use frame::{FrameDecoder, WireError};
pub use reply::ReplyLine;
pub use session::{Cursor, Gate, Session};

/// Prelude module for convenient imports
///
/// ```rust
/// use lightbox_wire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{CredentialStore, MemoryCredentials};
    pub use crate::codes::ReplyCode;
    pub use crate::command::{CommandKind, Request};
    pub use crate::frame::{FrameDecoder, WireError};
    pub use crate::reply::{continuation_wire_len, ParsedLine, ReplyLine};
    pub use crate::session::{Cursor, Gate, Session};
    pub use bytes::Bytes;
}
