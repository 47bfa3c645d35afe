//! In-process software authenticator.
//!
//! Backs the CLI walkthrough and the test suite. It keeps created
//! credentials in memory, honors the allow list on assertion, and exposes
//! knobs to simulate the degraded situations the core must survive: no
//! authenticator, insecure context, a user who declines the prompt, and a
//! platform that answers slowly. It also records every challenge it sees
//! and counts `create`/`get` invocations so tests can check challenge
//! freshness and single-in-flight guarantees.

use crate::authenticator::{
    CreatedCredential, CredentialCreationOptions, CredentialRequestOptions, PlatformAssertion,
    PlatformAuthenticator, PlatformError,
};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

const CREDENTIAL_ID_LEN: usize = 16;
const PUBLIC_KEY_LEN: usize = 32;

struct StoredEntry {
    rp_id: String,
    user_handle: Vec<u8>,
}

pub struct SoftAuthenticator {
    available: bool,
    secure: bool,
    consent: bool,
    response_delay: Option<Duration>,
    credentials: Mutex<HashMap<Vec<u8>, StoredEntry>>,
    seen_challenges: Mutex<Vec<Vec<u8>>>,
    create_calls: AtomicU32,
    get_calls: AtomicU32,
}

impl Default for SoftAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftAuthenticator {
    /// A healthy authenticator: present, secure context, consenting user.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: true,
            secure: true,
            consent: true,
            response_delay: None,
            credentials: Mutex::new(HashMap::new()),
            seen_challenges: Mutex::new(Vec::new()),
            create_calls: AtomicU32::new(0),
            get_calls: AtomicU32::new(0),
        }
    }

    /// Simulate a device with no user-verifying authenticator.
    #[must_use]
    pub fn without_authenticator(mut self) -> Self {
        self.available = false;
        self
    }

    /// Simulate a page served over an unencrypted transport.
    #[must_use]
    pub fn insecure_context(mut self) -> Self {
        self.secure = false;
        self
    }

    /// Simulate a user who dismisses every platform prompt.
    #[must_use]
    pub fn deny_consent(mut self) -> Self {
        self.consent = false;
        self
    }

    /// Delay every `create`/`get` answer, for timeout tests.
    #[must_use]
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = Some(delay);
        self
    }

    /// Every challenge observed so far, in call order.
    pub async fn challenges(&self) -> Vec<Vec<u8>> {
        self.seen_challenges.lock().await.clone()
    }

    #[must_use]
    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }

    async fn gate(&self, challenge: &[u8]) -> Result<(), PlatformError> {
        self.seen_challenges.lock().await.push(challenge.to_vec());

        if let Some(delay) = self.response_delay {
            tokio::time::sleep(delay).await;
        }
        if !self.secure {
            return Err(PlatformError::InsecureContext);
        }
        if !self.available {
            return Err(PlatformError::NotSupported);
        }
        if !self.consent {
            return Err(PlatformError::NotAllowed);
        }
        Ok(())
    }
}

impl PlatformAuthenticator for SoftAuthenticator {
    fn is_secure_context(&self) -> bool {
        self.secure
    }

    async fn is_user_verifying_available(&self) -> bool {
        self.available
    }

    async fn create(
        &self,
        options: CredentialCreationOptions,
    ) -> Result<CreatedCredential, PlatformError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.gate(&options.challenge).await?;

        let mut raw_id = vec![0u8; CREDENTIAL_ID_LEN];
        OsRng.fill_bytes(&mut raw_id);
        let mut public_key = vec![0u8; PUBLIC_KEY_LEN];
        OsRng.fill_bytes(&mut public_key);

        debug!(rp_id = %options.rp.id, user = %options.user.name, "created software credential");

        self.credentials.lock().await.insert(
            raw_id.clone(),
            StoredEntry {
                rp_id: options.rp.id,
                user_handle: options.user.handle,
            },
        );

        Ok(CreatedCredential { raw_id, public_key })
    }

    async fn get(
        &self,
        options: CredentialRequestOptions,
    ) -> Result<Option<PlatformAssertion>, PlatformError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.gate(&options.challenge).await?;

        let credentials = self.credentials.lock().await;
        for allowed in &options.allow_credentials {
            if let Some(entry) = credentials.get(&allowed.id) {
                if entry.rp_id != options.rp_id {
                    continue;
                }
                return Ok(Some(PlatformAssertion {
                    credential_id: allowed.id.clone(),
                    user_handle: Some(entry.user_handle.clone()),
                }));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticator::{
        AllowedCredential, AuthenticatorAttachment, AuthenticatorSelection, CoseAlgorithm,
        CredentialTransport, RelyingParty, ResidentKeyRequirement, UserDescriptor,
        UserVerification,
    };

    fn creation_options(challenge: Vec<u8>) -> CredentialCreationOptions {
        CredentialCreationOptions {
            challenge,
            rp: RelyingParty {
                id: "example.com".to_string(),
                name: "Example".to_string(),
            },
            user: UserDescriptor {
                handle: vec![7; 16],
                name: "alice".to_string(),
                display_name: "Alice".to_string(),
            },
            pub_key_cred_params: vec![CoseAlgorithm::Es256, CoseAlgorithm::Rs256],
            authenticator_selection: AuthenticatorSelection {
                attachment: AuthenticatorAttachment::Platform,
                user_verification: UserVerification::Required,
                resident_key: ResidentKeyRequirement::Preferred,
            },
            timeout_ms: 60_000,
        }
    }

    fn request_options(challenge: Vec<u8>, id: Vec<u8>) -> CredentialRequestOptions {
        CredentialRequestOptions {
            challenge,
            rp_id: "example.com".to_string(),
            allow_credentials: vec![AllowedCredential {
                id,
                transports: vec![CredentialTransport::Internal],
            }],
            user_verification: UserVerification::Required,
            timeout_ms: 60_000,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_the_credential_id() {
        let authenticator = SoftAuthenticator::new();
        let created = authenticator
            .create(creation_options(vec![1; 32]))
            .await
            .expect("create should succeed");

        let assertion = authenticator
            .get(request_options(vec![2; 32], created.raw_id.clone()))
            .await
            .expect("get should succeed")
            .expect("assertion should be produced");

        assert_eq!(assertion.credential_id, created.raw_id);
        assert_eq!(assertion.user_handle, Some(vec![7; 16]));
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_credential() {
        let authenticator = SoftAuthenticator::new();
        let assertion = authenticator
            .get(request_options(vec![2; 32], vec![9; 16]))
            .await
            .expect("get should succeed");
        assert!(assertion.is_none());
    }

    #[tokio::test]
    async fn get_rejects_credential_enrolled_under_other_rp() {
        let authenticator = SoftAuthenticator::new();
        let created = authenticator
            .create(creation_options(vec![1; 32]))
            .await
            .expect("create should succeed");

        let mut options = request_options(vec![2; 32], created.raw_id);
        options.rp_id = "other.example.com".to_string();
        let assertion = authenticator.get(options).await.expect("get should succeed");
        assert!(assertion.is_none());
    }

    #[tokio::test]
    async fn denied_consent_maps_to_not_allowed() {
        let authenticator = SoftAuthenticator::new().deny_consent();
        let err = authenticator
            .create(creation_options(vec![1; 32]))
            .await
            .expect_err("create should be refused");
        assert_eq!(err, PlatformError::NotAllowed);
    }

    #[tokio::test]
    async fn challenges_and_calls_are_recorded() {
        let authenticator = SoftAuthenticator::new();
        let _ = authenticator.create(creation_options(vec![1; 32])).await;
        let _ = authenticator.get(request_options(vec![2; 32], vec![0; 16])).await;

        assert_eq!(authenticator.create_calls(), 1);
        assert_eq!(authenticator.get_calls(), 1);
        assert_eq!(
            authenticator.challenges().await,
            vec![vec![1; 32], vec![2; 32]]
        );
    }
}
