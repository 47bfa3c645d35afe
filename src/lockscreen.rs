//! Lock-screen orchestration.
//!
//! State machine: `idle → scanning → {success, failed}`. One assertion
//! attempt is auto-triggered shortly after mount (configurable delay); every
//! attempt after a failure must be user-initiated, because unsolicited
//! repeated biometric prompts are a platform anti-pattern. A password (or
//! name-only) fallback stays reachable from every failure state.

use crate::authenticator::PlatformAuthenticator;
use crate::biometrics::{AssertionOutcome, BiometricsService, CredentialReference};
use crate::identity::IdentityStore;
use anyhow::{anyhow, Result};
use secrecy::ExposeSecret;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    Idle,
    Scanning,
    Success,
    Failed(String),
}

pub struct LockScreen<A, S> {
    service: BiometricsService<A>,
    store: S,
    state: Mutex<LockState>,
    auto_fired: AtomicBool,
}

impl<A: PlatformAuthenticator, S: IdentityStore> LockScreen<A, S> {
    pub fn new(service: BiometricsService<A>, store: S) -> Self {
        Self {
            service,
            store,
            state: Mutex::new(LockState::Idle),
            auto_fired: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> LockState {
        self.state.lock().await.clone()
    }

    #[must_use]
    pub fn service(&self) -> &BiometricsService<A> {
        &self.service
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Capability probe for the mounting screen: when this is `false` the
    /// UI hides biometric controls entirely and renders the password path.
    pub async fn is_biometrics_available(&self) -> bool {
        self.service.is_available().await
    }

    /// Enroll a credential for an existing profile and persist the
    /// reference against it. Re-enrollment overwrites the prior reference.
    ///
    /// # Errors
    /// Returns error if the profile is unknown, enrollment fails, or the
    /// store rejects the update. The caller must still let the user in
    /// without biometrics on failure.
    pub async fn enroll(&self, label: &str) -> Result<CredentialReference> {
        let identity = self
            .store
            .fetch_by_label(label)
            .await?
            .ok_or_else(|| anyhow!("No profile named {label}"))?;

        let credential = self.service.enroll(label).await?;
        self.store
            .update_credential(identity.id, credential.clone())
            .await?;

        info!(label, "stored biometric credential reference");
        Ok(credential)
    }

    /// Single auto-triggered attempt after mount. The latch flips before
    /// the delay, so re-invocation during the settle window (a re-render)
    /// issues no second platform call. Never re-arms after a failure.
    pub async fn auto_trigger(&self, label: &str) -> LockState {
        if self.auto_fired.swap(true, Ordering::SeqCst) {
            return self.state().await;
        }

        sleep(self.service.config().auto_trigger_delay()).await;
        self.try_unlock(label).await
    }

    /// Manual unlock attempt. While an attempt is in flight, further calls
    /// return `Scanning` without issuing a second platform call. A scan
    /// result that arrives after a password unlock or a reset already moved
    /// the machine on is discarded, never stored.
    pub async fn try_unlock(&self, label: &str) -> LockState {
        {
            let mut state = self.state.lock().await;
            if *state == LockState::Scanning {
                return LockState::Scanning;
            }
            *state = LockState::Scanning;
        }

        let next = self.run_assertion(label).await;

        let mut state = self.state.lock().await;
        // Only Scanning → next is a legal transition; anything else means
        // the scan was superseded while in flight and its result is stale.
        if *state != LockState::Scanning {
            return state.clone();
        }
        *state = next.clone();
        next
    }

    async fn run_assertion(&self, label: &str) -> LockState {
        let identity = match self.store.fetch_by_label(label).await {
            Ok(Some(identity)) => identity,
            Ok(None) => return LockState::Failed(format!("no profile named {label}")),
            Err(err) => {
                warn!(%err, "profile lookup failed");
                return LockState::Failed(err.to_string());
            }
        };

        let Some(mut credential) = identity.credential else {
            return LockState::Failed(
                "no biometric credential enrolled for this profile".to_string(),
            );
        };

        match self.service.authenticate(&credential.credential_id).await {
            AssertionOutcome::Verified => {
                credential.mark_used();
                if let Err(err) = self.store.update_credential(identity.id, credential).await {
                    warn!(%err, "failed to record credential usage");
                }
                sleep(self.service.config().success_grace()).await;
                info!(label, "biometric unlock succeeded");
                LockState::Success
            }
            outcome => {
                warn!(label, %outcome, "biometric unlock failed");
                LockState::Failed(outcome.to_string())
            }
        }
    }

    /// Password escape hatch, reachable from every failure state. Profiles
    /// without a stored password unlock on name alone.
    ///
    /// # Errors
    /// Returns error if the backing store fails.
    pub async fn unlock_with_password(&self, label: &str, password: Option<&str>) -> Result<bool> {
        let Some(identity) = self.store.fetch_by_label(label).await? else {
            return Ok(false);
        };

        let granted = match (&identity.password, password) {
            (Some(stored), Some(given)) => stored.expose_secret() == given,
            (Some(_), None) => false,
            (None, _) => true,
        };

        if granted {
            info!(label, "password fallback unlock succeeded");
            *self.state.lock().await = LockState::Success;
        }
        Ok(granted)
    }

    /// Re-arm `Idle` and clear the auto-trigger latch (switch account).
    pub async fn reset(&self) {
        self.auto_fired.store(false, Ordering::SeqCst);
        *self.state.lock().await = LockState::Idle;
    }
}
