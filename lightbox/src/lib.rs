//! # Lightbox
//!
//! A photo retrieval host (and matching client reader) for checksum-framed,
//! half-duplex byte streams - serial links and anything that behaves like
//! one.
//!
//! ## Architecture
//!
//! Lightbox is structured in three layers:
//!
//! - **`lightbox-core`**: transport plumbing - timeouts, buffers, shutdown
//! - **`lightbox-wire`**: the sans-IO protocol - framing, checksum, codes,
//!   command parsing, session gate, reply rendering
//! - **`lightbox`**: this crate - the vault, the command handlers, and the
//!   host/client endpoints that own a stream
//!
//! ## Quick Start
//!
//! ### Serving a photo tree over TCP
//!
//! ```rust,no_run
//! use lightbox::config::ServerConfig;
//! use lightbox::host::AlbumHost;
//! use lightbox_core::shutdown::ShutdownToken;
//! use lightbox_wire::auth::MemoryCredentials;
//!
//! #[compio::main]
//! async fn main() -> lightbox_core::error::Result<()> {
//!     let config = ServerConfig::new("./photoBase", "tcp://127.0.0.1:7878".parse()?);
//!     let vault = config.open_vault()?;
//!
//!     let mut credentials = MemoryCredentials::new();
//!     credentials.add_user("alice", "hunter2");
//!
//!     let listener = compio::net::TcpListener::bind("127.0.0.1:7878").await?;
//!     let (stream, _) = listener.accept().await?;
//!
//!     let mut host = AlbumHost::new(stream, config.link.clone(), ShutdownToken::new());
//!     host.serve(&vault, &credentials).await
//! }
//! ```
//!
//! ### Browsing as a client
//!
//! ```rust,no_run
//! use lightbox::client::AlbumClient;
//!
//! # async fn example() -> lightbox_core::error::Result<()> {
//! let stream = compio::net::TcpStream::connect("127.0.0.1:7878").await?;
//! let mut client = AlbumClient::new(stream);
//!
//! client.auth("alice", "hunter2").await?;
//! let listing = client.ls(None).await?;
//! let photo = client.get("beach.jpg").await?;
//! # Ok(())
//! # }
//! ```
//!
//! A serial device handle works the same way: both endpoints are generic
//! over `compio::io::AsyncRead + AsyncWrite`, so opening the device is the
//! embedding application's business.

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod client;
pub mod config;
pub mod dev_tracing;
pub mod handlers;
pub mod host;
pub mod vault;

// Re-export the lower layers for downstream convenience
pub use lightbox_core;
pub use lightbox_wire;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{AlbumClient, StatusReply, Transfer};
    pub use crate::config::ServerConfig;
    pub use crate::host::AlbumHost;
    pub use crate::vault::PhotoVault;
    pub use lightbox_core::prelude::*;
    pub use lightbox_wire::prelude::*;
}
