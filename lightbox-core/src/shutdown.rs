//! Cooperative shutdown signalling for the serve loop.
//!
//! The host's listen loop is strictly serial; it cannot be interrupted
//! mid-request. Instead it checks a shared token between requests and exits
//! cleanly when the token has fired. Clone the token freely - one copy goes
//! to the signal handler, one to each connection loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable, one-way shutdown signal.
///
/// Once triggered it stays triggered; there is no reset. A fresh server run
/// takes a fresh token.
///
/// # Example
///
/// ```
/// use lightbox_core::shutdown::ShutdownToken;
///
/// let token = ShutdownToken::new();
/// let for_handler = token.clone();
///
/// assert!(!token.is_triggered());
/// for_handler.trigger();
/// assert!(token.is_triggered());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    fired: Arc<AtomicBool>,
}

impl ShutdownToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request shutdown. Safe to call from a signal handler thread.
    pub fn trigger(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }

    /// True once any clone of this token has triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
