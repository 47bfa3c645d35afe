//! Biometric flow configuration.
//!
//! The relying-party identifier is an explicit value passed in by the
//! application, never read from the runtime environment at call time.
//! Credentials enrolled under one relying-party id are not portable to
//! another; changing it invalidates every enrolled credential.

use anyhow::{anyhow, Result};
use std::time::Duration;
use url::Url;

const DEFAULT_RP_NAME: &str = "Sentinela";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_AUTO_TRIGGER_MS: u64 = 900;
const DEFAULT_SUCCESS_GRACE_MS: u64 = 400;
const ENV_RP_ID: &str = "ALIRO_RP_ID";
const ENV_RP_NAME: &str = "ALIRO_RP_NAME";
const ENV_TIMEOUT_SECONDS: &str = "ALIRO_TIMEOUT_SECONDS";
const ENV_AUTO_TRIGGER_MS: &str = "ALIRO_AUTO_TRIGGER_MS";

#[derive(Clone, Debug)]
pub struct BiometricsConfig {
    rp_id: String,
    rp_name: String,
    timeout: Duration,
    auto_trigger_delay: Duration,
    success_grace: Duration,
}

impl BiometricsConfig {
    /// Build configuration from environment with safe defaults.
    ///
    /// # Errors
    /// Returns error if the effective relying-party id is not host-shaped.
    pub fn from_env(rp_id: &str, rp_name: &str) -> Result<Self> {
        let rp_id = std::env::var(ENV_RP_ID)
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| rp_id.to_string());

        let rp_name = std::env::var(ENV_RP_NAME)
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| rp_name.to_string());

        let timeout = std::env::var(ENV_TIMEOUT_SECONDS)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map_or_else(
                || Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
                Duration::from_secs,
            );

        let auto_trigger_delay = std::env::var(ENV_AUTO_TRIGGER_MS)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or_else(
                || Duration::from_millis(DEFAULT_AUTO_TRIGGER_MS),
                Duration::from_millis,
            );

        Ok(Self::new(rp_id, rp_name)?
            .with_timeout(timeout)
            .with_auto_trigger_delay(auto_trigger_delay))
    }

    /// Create a new configuration with default timings.
    ///
    /// # Errors
    /// Returns error if the relying-party id is empty or not host-shaped.
    pub fn new(rp_id: String, rp_name: String) -> Result<Self> {
        let rp_id = normalize_rp_id(&rp_id)?;
        let rp_name = if rp_name.trim().is_empty() {
            DEFAULT_RP_NAME.to_string()
        } else {
            rp_name.trim().to_string()
        };

        Ok(Self {
            rp_id,
            rp_name,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            auto_trigger_delay: Duration::from_millis(DEFAULT_AUTO_TRIGGER_MS),
            success_grace: Duration::from_millis(DEFAULT_SUCCESS_GRACE_MS),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_auto_trigger_delay(mut self, delay: Duration) -> Self {
        self.auto_trigger_delay = delay;
        self
    }

    #[must_use]
    pub fn with_success_grace(mut self, grace: Duration) -> Self {
        self.success_grace = grace;
        self
    }

    #[must_use]
    pub fn rp_id(&self) -> &str {
        &self.rp_id
    }

    #[must_use]
    pub fn rp_name(&self) -> &str {
        &self.rp_name
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn auto_trigger_delay(&self) -> Duration {
        self.auto_trigger_delay
    }

    #[must_use]
    pub fn success_grace(&self) -> Duration {
        self.success_grace
    }
}

// A relying-party id is a bare lowercase host: no scheme, port, or path.
fn normalize_rp_id(rp_id: &str) -> Result<String> {
    let trimmed = rp_id.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return Err(anyhow!("Relying-party id must not be empty"));
    }

    let parsed = Url::parse(&format!("https://{trimmed}"))
        .map_err(|err| anyhow!("Invalid relying-party id {trimmed}: {err}"))?;
    if parsed.host_str() != Some(trimmed.as_str()) {
        return Err(anyhow!(
            "Relying-party id must be a bare host, got: {rp_id}"
        ));
    }

    Ok(trimmed)
}
