use anyhow::{anyhow, Result};
use base64ct::{Base64, Encoding};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Challenge length mandated for every enrollment and assertion call.
pub const CHALLENGE_LEN: usize = 32;

/// Opaque user-handle length used during enrollment.
pub const USER_HANDLE_LEN: usize = 16;

/// Durable artifact of enrollment: the credential id and public key encoded
/// as base64 text, since the persistence adapter only accepts text fields.
///
/// One active reference per identity; re-enrollment overwrites the prior
/// reference. A reference is only ever stored against a resolvable identity
/// record, never on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialReference {
    pub credential_id: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl CredentialReference {
    /// Encode the raw pair returned by the platform for storage.
    #[must_use]
    pub fn from_raw(raw_id: &[u8], public_key: &[u8]) -> Self {
        Self {
            credential_id: Base64::encode_string(raw_id),
            public_key: Base64::encode_string(public_key),
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    /// Decode the credential id back to its raw byte form.
    ///
    /// # Errors
    /// Returns error if the stored text is not valid base64.
    pub fn credential_id_bytes(&self) -> Result<Vec<u8>> {
        decode_text(&self.credential_id)
    }

    /// Decode the public key back to its raw byte form.
    ///
    /// # Errors
    /// Returns error if the stored text is not valid base64.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        decode_text(&self.public_key)
    }

    pub fn mark_used(&mut self) {
        self.last_used_at = Some(Utc::now());
    }
}

fn decode_text(encoded: &str) -> Result<Vec<u8>> {
    Base64::decode_vec(encoded).map_err(|err| anyhow!("Invalid credential encoding: {err}"))
}

/// Per-operation random nonce. Never persisted, never reused; generated
/// fresh from the OS random source for every platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge([u8; CHALLENGE_LEN]);

impl Challenge {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; CHALLENGE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0.to_vec()
    }
}

/// Opaque random user handle for enrollment.
#[must_use]
pub fn random_user_handle() -> Vec<u8> {
    let mut bytes = vec![0u8; USER_HANDLE_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Tagged assertion result. Callers get enough detail to give the user
/// accurate guidance instead of a collapsed pass/fail boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionOutcome {
    Verified,
    /// The user dismissed or declined the platform prompt.
    Declined,
    /// The platform did not answer within the configured bound.
    TimedOut,
    /// The stored credential id is unknown to this device, undecodable, or
    /// the platform produced no assertion for it.
    NoMatchingCredential,
    PlatformError(String),
}

impl AssertionOutcome {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl fmt::Display for AssertionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => write!(f, "verified"),
            Self::Declined => write!(f, "verification was cancelled, try again or use your password"),
            Self::TimedOut => write!(f, "verification timed out, try again or use your password"),
            Self::NoMatchingCredential => {
                write!(f, "no matching credential on this device, use your password")
            }
            Self::PlatformError(detail) => {
                write!(f, "biometric hardware reported a problem ({detail}), use your password")
            }
        }
    }
}

/// Enrollment failure taxonomy. Each variant carries distinct user-facing
/// advice; the caller must let the user proceed without biometrics on any
/// of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollError {
    /// No user-verifying platform authenticator; hide biometric options.
    CapabilityUnavailable,
    /// The user declined the platform prompt; retry must be user-initiated.
    UserDeclined,
    /// Not served over an encrypted transport; switch to HTTPS.
    InsecureContext,
    /// Unspecified platform or hardware failure.
    Platform(String),
}

impl fmt::Display for EnrollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityUnavailable => {
                write!(f, "this device has no biometric authenticator")
            }
            Self::UserDeclined => write!(f, "biometric enrollment was cancelled"),
            Self::InsecureContext => {
                write!(f, "biometric enrollment requires a secure (HTTPS) connection")
            }
            Self::Platform(detail) => {
                write!(f, "biometric enrollment failed: {detail}")
            }
        }
    }
}

impl std::error::Error for EnrollError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_reference_round_trips_raw_bytes() -> Result<()> {
        let reference = CredentialReference::from_raw(&[1, 2, 3], &[4, 5, 6]);
        assert!(!reference.credential_id.is_empty());
        assert!(!reference.public_key.is_empty());
        assert_eq!(reference.credential_id_bytes()?, vec![1, 2, 3]);
        assert_eq!(reference.public_key_bytes()?, vec![4, 5, 6]);
        assert!(reference.last_used_at.is_none());
        Ok(())
    }

    #[test]
    fn invalid_encoding_is_rejected() {
        let reference = CredentialReference {
            credential_id: "not base64 at all!".to_string(),
            public_key: String::new(),
            created_at: Utc::now(),
            last_used_at: None,
        };
        assert!(reference.credential_id_bytes().is_err());
    }

    #[test]
    fn challenges_are_fresh_per_generation() {
        let first = Challenge::generate();
        let second = Challenge::generate();
        assert_eq!(first.as_bytes().len(), CHALLENGE_LEN);
        assert_ne!(first, second);
    }

    #[test]
    fn user_handles_are_fresh_and_sized() {
        let first = random_user_handle();
        let second = random_user_handle();
        assert_eq!(first.len(), USER_HANDLE_LEN);
        assert_ne!(first, second);
    }

    #[test]
    fn mark_used_sets_timestamp() {
        let mut reference = CredentialReference::from_raw(&[1], &[2]);
        reference.mark_used();
        assert!(reference.last_used_at.is_some());
    }

    #[test]
    fn only_verified_counts_as_verified() {
        assert!(AssertionOutcome::Verified.is_verified());
        assert!(!AssertionOutcome::Declined.is_verified());
        assert!(!AssertionOutcome::TimedOut.is_verified());
        assert!(!AssertionOutcome::NoMatchingCredential.is_verified());
        assert!(!AssertionOutcome::PlatformError("x".to_string()).is_verified());
    }

    #[test]
    fn enroll_errors_carry_distinct_advice() {
        let messages: Vec<String> = [
            EnrollError::CapabilityUnavailable,
            EnrollError::UserDeclined,
            EnrollError::InsecureContext,
            EnrollError::Platform("sensor fault".to_string()),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        for (i, msg) in messages.iter().enumerate() {
            for other in messages.iter().skip(i + 1) {
                assert_ne!(msg, other);
            }
        }
    }
}
