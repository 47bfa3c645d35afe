//! Biometric credential service: capability probe, enrollment, assertion.
//!
//! Flow Overview:
//! 1) Probe whether a user-verifying platform authenticator is present.
//! 2) Enroll a credential bound to a profile; the caller persists the
//!    returned reference against the identity record.
//! 3) Assert against a stored credential id with a fresh challenge per call.
//!
//! Security boundaries:
//! - A fresh 32-byte challenge is generated from the OS random source for
//!   every platform call and never reused.
//! - Only platform-attached authenticators with mandatory user verification
//!   are acceptable; assertions are restricted to exactly the stored
//!   credential id with transport hint "internal".
//! - Failures never trigger an automatic retry: every new attempt requires
//!   a fresh physical gesture from the user.

use crate::authenticator::{
    AllowedCredential, AuthenticatorAttachment, AuthenticatorSelection, CoseAlgorithm,
    CredentialCreationOptions, CredentialRequestOptions, CredentialTransport,
    PlatformAuthenticator, PlatformError, RelyingParty, ResidentKeyRequirement, UserDescriptor,
    UserVerification,
};
use crate::biometrics::config::BiometricsConfig;
use crate::biometrics::models::{
    random_user_handle, AssertionOutcome, Challenge, CredentialReference, EnrollError,
};
use base64ct::{Base64, Encoding};
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub struct BiometricsService<A> {
    config: BiometricsConfig,
    authenticator: A,
}

impl<A: PlatformAuthenticator> BiometricsService<A> {
    pub fn new(config: BiometricsConfig, authenticator: A) -> Self {
        Self {
            config,
            authenticator,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BiometricsConfig {
        &self.config
    }

    #[must_use]
    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Capability probe. Never errors and never caches: authenticator
    /// availability can change between calls, so this is safe to invoke on
    /// every screen mount.
    pub async fn is_available(&self) -> bool {
        if !self.authenticator.is_secure_context() {
            debug!("insecure context, biometrics unavailable");
            return false;
        }
        self.authenticator.is_user_verifying_available().await
    }

    /// Enroll a new credential for `identity_label`.
    ///
    /// The returned reference is NOT persisted here; the caller stores it
    /// against the identity record.
    ///
    /// # Errors
    /// Returns an [`EnrollError`] naming the cause so the caller can advise
    /// the user. Never retries on its own.
    pub async fn enroll(&self, identity_label: &str) -> Result<CredentialReference, EnrollError> {
        let options = CredentialCreationOptions {
            challenge: Challenge::generate().into_vec(),
            rp: RelyingParty {
                id: self.config.rp_id().to_string(),
                name: self.config.rp_name().to_string(),
            },
            user: UserDescriptor {
                handle: random_user_handle(),
                name: identity_label.to_string(),
                display_name: identity_label.to_string(),
            },
            pub_key_cred_params: vec![CoseAlgorithm::Es256, CoseAlgorithm::Rs256],
            authenticator_selection: AuthenticatorSelection {
                attachment: AuthenticatorAttachment::Platform,
                user_verification: UserVerification::Required,
                resident_key: ResidentKeyRequirement::Preferred,
            },
            timeout_ms: timeout_millis(&self.config),
        };

        let created = match timeout(self.config.timeout(), self.authenticator.create(options))
            .await
        {
            Err(_) => {
                warn!(label = identity_label, "enrollment timed out");
                return Err(EnrollError::Platform(
                    "the authenticator did not respond in time".to_string(),
                ));
            }
            Ok(Err(err)) => {
                warn!(label = identity_label, %err, "enrollment refused by platform");
                return Err(map_platform_error(err));
            }
            Ok(Ok(created)) => created,
        };

        if created.raw_id.is_empty() || created.public_key.is_empty() {
            return Err(EnrollError::Platform(
                "the authenticator returned an empty credential".to_string(),
            ));
        }

        info!(label = identity_label, "enrolled biometric credential");
        Ok(CredentialReference::from_raw(
            &created.raw_id,
            &created.public_key,
        ))
    }

    /// Request an assertion for a previously stored credential id.
    ///
    /// Infallible by design: failed verification is an expected frequent
    /// outcome, so every failure mode is an [`AssertionOutcome`] variant
    /// rather than an error. No password fallback happens here; that is an
    /// orchestration decision of the caller.
    pub async fn authenticate(&self, stored_credential_id: &str) -> AssertionOutcome {
        let Ok(raw_id) = Base64::decode_vec(stored_credential_id) else {
            warn!("stored credential id is not valid base64");
            return AssertionOutcome::NoMatchingCredential;
        };

        let options = CredentialRequestOptions {
            challenge: Challenge::generate().into_vec(),
            rp_id: self.config.rp_id().to_string(),
            allow_credentials: vec![AllowedCredential {
                id: raw_id.clone(),
                transports: vec![CredentialTransport::Internal],
            }],
            user_verification: UserVerification::Required,
            timeout_ms: timeout_millis(&self.config),
        };

        match timeout(self.config.timeout(), self.authenticator.get(options)).await {
            Err(_) => {
                warn!("assertion timed out");
                AssertionOutcome::TimedOut
            }
            Ok(Err(PlatformError::NotAllowed)) => {
                debug!("assertion declined by user");
                AssertionOutcome::Declined
            }
            Ok(Err(err)) => {
                warn!(%err, "assertion refused by platform");
                AssertionOutcome::PlatformError(err.to_string())
            }
            Ok(Ok(Some(assertion))) if assertion.credential_id == raw_id => {
                info!("assertion verified");
                AssertionOutcome::Verified
            }
            Ok(Ok(_)) => {
                debug!("no assertion produced for the stored credential");
                AssertionOutcome::NoMatchingCredential
            }
        }
    }
}

fn map_platform_error(err: PlatformError) -> EnrollError {
    match err {
        PlatformError::NotAllowed => EnrollError::UserDeclined,
        PlatformError::InsecureContext => EnrollError::InsecureContext,
        PlatformError::NotSupported => EnrollError::CapabilityUnavailable,
        PlatformError::Other(detail) => EnrollError::Platform(detail),
    }
}

fn timeout_millis(config: &BiometricsConfig) -> u64 {
    u64::try_from(config.timeout().as_millis()).unwrap_or(u64::MAX)
}
