//! Credential-store seam.
//!
//! The protocol treats credentials as an opaque `lookup(user) -> password`
//! collaborator; the storage format is somebody else's problem. The host
//! compares the looked-up password against the presented one - exact match,
//! case-sensitive - and either binds a session or reports code 101.

/// Credential lookup trait
///
/// Implement this to back authentication with whatever store the deployment
/// uses. The in-memory implementation below is for tests and small setups.
#[async_trait::async_trait(?Send)]
pub trait CredentialStore {
    /// The stored password for `user`, or `None` for an unknown user.
    async fn lookup(&self, user: &str) -> Option<String>;
}

/// Exact-match credential verification.
///
/// Unknown user and wrong password are indistinguishable to the peer - both
/// are an authorisation error.
pub async fn verify<C: CredentialStore + ?Sized>(
    store: &C,
    user: &str,
    password: &str,
) -> bool {
    matches!(store.lookup(user).await, Some(expected) if expected == password)
}

/// Simple credential map
///
/// Validates against a static map of username -> password.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    credentials: std::collections::HashMap<String, String>,
}

impl MemoryCredentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.credentials.insert(user.into(), password.into());
    }
}

#[async_trait::async_trait(?Send)]
impl CredentialStore for MemoryCredentials {
    async fn lookup(&self, user: &str) -> Option<String> {
        self.credentials.get(user).cloned()
    }
}
