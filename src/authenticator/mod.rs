//! Platform authenticator boundary.
//!
//! The public-key credential API of the host platform is consumed, not
//! implemented, by this crate. Everything the core needs from it is behind
//! the [`PlatformAuthenticator`] trait so enrollment, assertion, and the
//! lock screen can run against stubs in tests and against the in-process
//! [`SoftAuthenticator`] in the CLI demo.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod soft;

pub use soft::SoftAuthenticator;

/// COSE signature algorithm identifiers, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoseAlgorithm {
    /// ECDSA over P-256 with SHA-256.
    Es256 = -7,
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    Rs256 = -257,
}

impl CoseAlgorithm {
    /// Numeric COSE identifier as sent to the platform.
    #[must_use]
    pub const fn id(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingParty {
    pub id: String,
    pub name: String,
}

/// The identity the credential is being bound to. The handle is an opaque
/// 16-byte value, never the profile name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDescriptor {
    pub handle: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticatorAttachment {
    Platform,
    CrossPlatform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserVerification {
    Required,
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResidentKeyRequirement {
    Required,
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialTransport {
    Internal,
    Usb,
    Nfc,
    Ble,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatorSelection {
    pub attachment: AuthenticatorAttachment,
    pub user_verification: UserVerification,
    pub resident_key: ResidentKeyRequirement,
}

/// Credential-creation request submitted during enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCreationOptions {
    pub challenge: Vec<u8>,
    pub rp: RelyingParty,
    pub user: UserDescriptor,
    pub pub_key_cred_params: Vec<CoseAlgorithm>,
    pub authenticator_selection: AuthenticatorSelection,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedCredential {
    pub id: Vec<u8>,
    pub transports: Vec<CredentialTransport>,
}

/// Credential-request descriptor submitted during assertion. The allow list
/// restricts acceptable credentials to exactly the ones supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequestOptions {
    pub challenge: Vec<u8>,
    pub rp_id: String,
    pub allow_credentials: Vec<AllowedCredential>,
    pub user_verification: UserVerification,
    pub timeout_ms: u64,
}

/// Raw result of a successful credential creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedCredential {
    pub raw_id: Vec<u8>,
    pub public_key: Vec<u8>,
}

/// Raw result of a successful assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformAssertion {
    pub credential_id: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// Failure modes reported by the platform credential API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user declined or dismissed the platform prompt.
    NotAllowed,
    /// The execution context is not served over an encrypted transport.
    InsecureContext,
    /// No public-key credential capability on this platform.
    NotSupported,
    Other(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowed => write!(f, "the user declined the platform prompt"),
            Self::InsecureContext => write!(f, "the context is not secure"),
            Self::NotSupported => write!(f, "no platform credential support"),
            Self::Other(detail) => write!(f, "platform failure: {detail}"),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Entry points of the platform public-key credential API.
///
/// `create` and `get` suspend until the user completes or cancels the
/// physical gesture; callers bound them with their own timeout and must not
/// issue overlapping calls.
#[allow(async_fn_in_trait)]
pub trait PlatformAuthenticator: Send + Sync {
    /// Whether the execution context uses an encrypted transport.
    fn is_secure_context(&self) -> bool;

    /// Whether a user-verifying platform authenticator is present. May
    /// change between calls (sensors attach and detach), so results must
    /// not be cached.
    async fn is_user_verifying_available(&self) -> bool;

    /// Create a new credential.
    ///
    /// # Errors
    /// Returns a [`PlatformError`] when the platform refuses or the user
    /// cancels.
    async fn create(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<CreatedCredential, PlatformError>;

    /// Request an assertion. `Ok(None)` means the platform completed the
    /// ceremony without producing an assertion for the allow list.
    ///
    /// # Errors
    /// Returns a [`PlatformError`] when the platform refuses or the user
    /// cancels.
    async fn get(
        &self,
        options: CredentialRequestOptions,
    ) -> Result<Option<PlatformAssertion>, PlatformError>;
}
