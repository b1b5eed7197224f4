//! The photo vault: sandboxed filesystem access.
//!
//! All navigation and file access happens beneath one configured root. The
//! cursor paths produced by `lightbox-wire` are relative to the root's
//! *parent*, so resolving one is a single join against that base directory.
//!
//! Resolution is raw by default: `..` segments travel to the filesystem
//! as written, so a peer can navigate outside the root. The `confine`
//! option makes containment explicit - when set, every resolved path must
//! canonicalize to a descendant of the root.

use std::fs;
use std::path::{Path, PathBuf};

use lightbox_core::error::LightboxError;
use thiserror::Error;
use tracing::trace;

/// The full set of photo extensions this host knows how to serve.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "gif", "png"];

/// The subset allowed when the operator configures nothing.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["jpeg", "jpg"];

/// Vault access failures, each mapping to exactly one reply code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    /// Path is absent, not the right kind of entry, or outside the
    /// confinement boundary (149)
    #[error("Path not found")]
    NotFound,

    /// File extension outside the allow-list (103)
    #[error("Unsupported file")]
    Unsupported,

    /// The file exists but could not be read (104)
    #[error("File could not be read")]
    ReadFailed,
}

/// Sandboxed photo tree.
#[derive(Debug, Clone)]
pub struct PhotoVault {
    /// Canonical sandbox root
    root: PathBuf,
    /// Parent of the root; cursor-relative paths resolve against this
    base: PathBuf,
    /// Allowed extensions, lowercase
    allowed: Vec<String>,
    /// Enforce containment under `root` on every resolution
    confine: bool,
}

impl PhotoVault {
    /// Open a vault over `root`.
    ///
    /// # Errors
    ///
    /// Configuration errors (missing root, root not a directory) - these are
    /// startup-fatal by design.
    pub fn open(
        root: &Path,
        allowed: &[String],
        confine: bool,
    ) -> Result<Self, LightboxError> {
        let root = root.canonicalize().map_err(|e| {
            LightboxError::config(format!("sandbox root {}: {}", root.display(), e))
        })?;
        if !root.is_dir() {
            return Err(LightboxError::config(format!(
                "sandbox root {} is not a directory",
                root.display()
            )));
        }
        let base = root
            .parent()
            .map_or_else(|| root.clone(), Path::to_path_buf);
        Ok(Self {
            root,
            base,
            allowed: allowed.iter().map(|e| e.to_ascii_lowercase()).collect(),
            confine,
        })
    }

    /// The canonical sandbox root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Case-insensitive allow-list check on a file name's extension.
    #[must_use]
    pub fn extension_allowed(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.allowed.iter().any(|a| *a == ext)
            }
            _ => false,
        }
    }

    /// Filesystem position of a cursor-relative path.
    #[must_use]
    pub fn fs_path(&self, rel: &Path) -> PathBuf {
        self.base.join(rel)
    }

    /// Resolve a cursor-relative path that must be an existing directory.
    pub fn resolve_dir(&self, rel: &Path) -> Result<PathBuf, VaultError> {
        let target = self.fs_path(rel);
        if !target.is_dir() {
            return Err(VaultError::NotFound);
        }
        self.check_confinement(&target)?;
        Ok(target)
    }

    /// List the immediate children of a cursor-relative directory.
    ///
    /// Directories come back as `d-<name>`, allowed-extension files as
    /// `f-<name>`; everything else is omitted. Entries are sorted by name so
    /// listings are stable.
    pub fn list(&self, rel: &Path) -> Result<Vec<String>, VaultError> {
        let dir = self.resolve_dir(rel)?;
        let mut entries = Vec::new();
        let read = fs::read_dir(&dir).map_err(|_| VaultError::NotFound)?;
        for entry in read {
            let Ok(entry) = entry else { continue };
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(kind) = entry.file_type() else { continue };
            if kind.is_dir() {
                entries.push(format!("d-{name}"));
            } else if kind.is_file() && self.extension_allowed(&name) {
                entries.push(format!("f-{name}"));
            }
            // symlinks and specials are omitted
        }
        entries.sort();
        trace!("[VAULT] Listed {}: {} entries", dir.display(), entries.len());
        Ok(entries)
    }

    /// Read a photo's raw bytes.
    ///
    /// Checks run in order: the path must exist as a regular file (149),
    /// carry an allowed extension (103), and be readable (104).
    pub fn read_photo(&self, rel: &Path) -> Result<Vec<u8>, VaultError> {
        let target = self.fs_path(rel);
        if !target.is_file() {
            return Err(VaultError::NotFound);
        }
        self.check_confinement(&target)?;
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.extension_allowed(&name) {
            return Err(VaultError::Unsupported);
        }
        fs::read(&target).map_err(|_| VaultError::ReadFailed)
    }

    /// With confinement on, an existing path must canonicalize to a
    /// descendant of the root. Violations read as "not found" - the peer
    /// learns nothing about what exists outside.
    fn check_confinement(&self, target: &Path) -> Result<(), VaultError> {
        if !self.confine {
            return Ok(());
        }
        match target.canonicalize() {
            Ok(real) if real.starts_with(&self.root) => Ok(()),
            _ => Err(VaultError::NotFound),
        }
    }
}
