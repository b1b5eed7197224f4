//! Server startup configuration.
//!
//! Everything here is validated once at startup; a bad value aborts startup
//! rather than ever surfacing mid-session. The sandbox root is an explicit
//! value owned by the server instance and handed to each session at
//! creation - never process-wide mutable state.

use std::path::PathBuf;

use lightbox_core::endpoint::Endpoint;
use lightbox_core::error::LightboxError;
use lightbox_core::options::LinkOptions;

use crate::vault::{PhotoVault, DEFAULT_EXTENSIONS, SUPPORTED_EXTENSIONS};

/// Recognized startup options: sandbox root, transport endpoint (identifier
/// plus baud for serial), allowed extensions, containment, link tuning.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Sandbox root containing the photo tree
    pub root: PathBuf,
    /// Where to listen (or which device the embedder will open)
    pub endpoint: Endpoint,
    /// Allowed photo extensions; must be a subset of
    /// [`SUPPORTED_EXTENSIONS`]
    pub extensions: Vec<String>,
    /// Enforce containment beneath the sandbox root
    pub confine_to_root: bool,
    /// Per-connection link tuning
    pub link: LinkOptions,
}

impl ServerConfig {
    /// Configuration with the default extension set and link tuning.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, endpoint: Endpoint) -> Self {
        Self {
            root: root.into(),
            endpoint,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            confine_to_root: false,
            link: LinkOptions::default(),
        }
    }

    /// Replace the allowed-extension list.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Enable or disable containment beneath the sandbox root.
    #[must_use]
    pub fn with_confinement(mut self, confine: bool) -> Self {
        self.confine_to_root = confine;
        self
    }

    /// Replace the link tuning.
    #[must_use]
    pub fn with_link(mut self, link: LinkOptions) -> Self {
        self.link = link;
        self
    }

    /// Validate everything that does not need the filesystem.
    ///
    /// # Errors
    ///
    /// `LightboxError::Config` for an empty extension list or one naming an
    /// extension the host does not know how to serve.
    pub fn validate(&self) -> Result<(), LightboxError> {
        if self.extensions.is_empty() {
            return Err(LightboxError::config("allowed-extension list is empty"));
        }
        for ext in &self.extensions {
            let lower = ext.to_ascii_lowercase();
            if !SUPPORTED_EXTENSIONS.contains(&lower.as_str()) {
                return Err(LightboxError::config(format!(
                    "extension {ext:?} is not supported (supported: {})",
                    SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Validate and open the vault. Root problems surface here, fatally.
    pub fn open_vault(&self) -> Result<PhotoVault, LightboxError> {
        self.validate()?;
        PhotoVault::open(&self.root, &self.extensions, self.confine_to_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::parse("tcp://127.0.0.1:7878").unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new("/srv/photoBase", endpoint());
        assert_eq!(config.extensions, vec!["jpeg", "jpg"]);
        assert!(!config.confine_to_root);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let config = ServerConfig::new("/srv/photoBase", endpoint())
            .with_extensions(vec!["jpg".to_string(), "bmp".to_string()]);
        assert!(matches!(
            config.validate(),
            Err(LightboxError::Config(msg)) if msg.contains("bmp")
        ));
    }

    #[test]
    fn test_rejects_empty_extension_list() {
        let config =
            ServerConfig::new("/srv/photoBase", endpoint()).with_extensions(Vec::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extension_validation_is_case_insensitive() {
        let config = ServerConfig::new("/srv/photoBase", endpoint())
            .with_extensions(vec!["PNG".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_vault_requires_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let config = ServerConfig::new(&missing, endpoint());
        assert!(matches!(
            config.open_vault(),
            Err(LightboxError::Config(_))
        ));

        let root = dir.path().join("photoBase");
        std::fs::create_dir(&root).unwrap();
        let config = ServerConfig::new(&root, endpoint());
        assert!(config.open_vault().is_ok());
    }
}
