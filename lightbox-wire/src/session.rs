//! Per-connection session state.
//!
//! A [`Session`] exists exactly when the connection has completed `auth`;
//! the [`Gate`] enum makes that an explicit state machine instead of an
//! optional field. Failed authentication leaves nothing behind.

use std::path::{Path, PathBuf};

/// Sandboxed navigation cursor.
///
/// The cursor's path is expressed relative to the *parent* of the sandbox
/// root and always starts with the root's leaf name, so `pwd` straight after
/// `cd ~` reports exactly that leaf. Joins are raw - `..` segments are kept
/// as written and resolved later by the filesystem; containment, when
/// wanted, is a separate and explicit vault option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    home: String,
    rel: PathBuf,
}

impl Cursor {
    /// Cursor positioned at the sandbox root.
    #[must_use]
    pub fn at_root(sandbox_root: &Path) -> Self {
        let home = sandbox_root
            .file_name()
            .map_or_else(|| ".".to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            rel: PathBuf::from(&home),
            home,
        }
    }

    /// `cd ~`: back to the sandbox root's leaf name, whatever came before.
    pub fn reset(&mut self) {
        self.rel = PathBuf::from(&self.home);
    }

    /// Candidate position for `cd <arg>` / target for `ls <arg>`,
    /// `get <arg>`. No normalization.
    #[must_use]
    pub fn joined(&self, arg: &str) -> PathBuf {
        self.rel.join(arg)
    }

    /// Commit a move to a position previously produced by [`joined`].
    ///
    /// [`joined`]: Cursor::joined
    pub fn enter(&mut self, rel: PathBuf) {
        self.rel = rel;
    }

    /// Current position relative to the sandbox root's parent.
    #[must_use]
    pub fn rel_path(&self) -> &Path {
        &self.rel
    }

    /// The `pwd` answer: components joined with `/` regardless of platform.
    #[must_use]
    pub fn display(&self) -> String {
        self.rel
            .iter()
            .map(|c| c.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// One authenticated connection's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: String,
    pub cursor: Cursor,
}

impl Session {
    #[must_use]
    pub fn new(user: impl Into<String>, sandbox_root: &Path) -> Self {
        Self {
            user: user.into(),
            cursor: Cursor::at_root(sandbox_root),
        }
    }
}

/// Authentication gate: the connection either has a session or it does not.
#[derive(Debug, Clone, Default)]
pub enum Gate {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl Gate {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Unauthenticated => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Unauthenticated => None,
        }
    }

    /// Successful `auth`: bind a fresh session to the connection.
    pub fn authenticate(&mut self, session: Session) {
        *self = Self::Authenticated(session);
    }

    /// `quit` or disconnect: drop the session, keep the connection state.
    pub fn clear(&mut self) {
        *self = Self::Unauthenticated;
    }
}
