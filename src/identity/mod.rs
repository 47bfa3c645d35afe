//! Identity persistence boundary.
//!
//! The credential core depends on exactly two operations: look a profile up
//! by label and attach a credential reference to it. Everything else about
//! profile storage lives outside this crate; [`MemoryIdentityStore`] is the
//! in-process implementation used by tests and the CLI demo.

use crate::biometrics::CredentialReference;
use anyhow::Result;
use regex::Regex;
use secrecy::SecretString;
use uuid::Uuid;

pub mod memory;

pub use memory::MemoryIdentityStore;

/// A profile record. The credential reference is meaningless without the
/// identity it is bound to and is only ever read or written through a
/// resolved identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub site: String,
    pub password: Option<SecretString>,
    pub photo_url: Option<String>,
    pub credential: Option<CredentialReference>,
}

impl Identity {
    #[must_use]
    pub fn new(name: String, role: String, site: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            role,
            site,
            password: None,
            photo_url: None,
            credential: None,
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    #[must_use]
    pub fn with_photo_url(mut self, photo_url: String) -> Self {
        self.photo_url = Some(photo_url);
        self
    }
}

/// Operations the credential core needs from profile storage.
#[allow(async_fn_in_trait)]
pub trait IdentityStore: Send + Sync {
    /// Look a profile up by its label (display name).
    ///
    /// # Errors
    /// Returns error if the backing store fails.
    async fn fetch_by_label(&self, label: &str) -> Result<Option<Identity>>;

    /// Create a profile record.
    ///
    /// # Errors
    /// Returns error if the label is invalid or already taken.
    async fn create(&self, identity: Identity) -> Result<()>;

    /// Attach a credential reference to a profile, overwriting any prior
    /// reference (one active credential per identity).
    ///
    /// # Errors
    /// Returns error if the identity does not exist.
    async fn update_credential(&self, id: Uuid, credential: CredentialReference) -> Result<()>;

    /// Delete a profile record. The credential reference disappears with it;
    /// there is no independent credential deletion.
    ///
    /// # Errors
    /// Returns error if the backing store fails.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

pub fn valid_label(label: &str) -> bool {
    Regex::new(r"^[A-Za-z][A-Za-z0-9 .'-]{0,63}$").map_or(false, |re| re.is_match(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_must_start_with_a_letter_and_stay_short() {
        assert!(valid_label("Alice Mokrini"));
        assert!(valid_label("J. O'Brien-Smith"));
        assert!(!valid_label(""));
        assert!(!valid_label(" leading space"));
        assert!(!valid_label("9lives"));
        assert!(!valid_label(&"a".repeat(65)));
        assert!(!valid_label("tab\tseparated"));
    }

    #[test]
    fn identity_builder_sets_optional_fields() {
        let identity = Identity::new(
            "Alice".to_string(),
            "supervisor".to_string(),
            "north-yard".to_string(),
        )
        .with_password(SecretString::from("hunter2".to_string()))
        .with_photo_url("https://cdn.example.com/alice.webp".to_string());

        assert!(identity.password.is_some());
        assert_eq!(
            identity.photo_url.as_deref(),
            Some("https://cdn.example.com/alice.webp")
        );
        assert!(identity.credential.is_none());
    }
}
