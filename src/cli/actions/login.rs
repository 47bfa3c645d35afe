use crate::authenticator::SoftAuthenticator;
use crate::biometrics::{BiometricsConfig, BiometricsService};
use crate::identity::{valid_label, Identity, IdentityStore, MemoryIdentityStore};
use crate::lockscreen::{LockScreen, LockState};
use anyhow::{anyhow, Result};

/// Walk the full lock-screen flow against the software authenticator:
/// probe, enroll, lock, auto-trigger one assertion, report the outcome.
///
/// # Errors
/// Returns error if the label is invalid or setup fails.
pub async fn execute(rp_id: &str, rp_name: &str, label: &str) -> Result<()> {
    if !valid_label(label) {
        return Err(anyhow!("Invalid profile name: {label}"));
    }

    let config = BiometricsConfig::from_env(rp_id, rp_name)?;
    let service = BiometricsService::new(config, SoftAuthenticator::new());
    let store = MemoryIdentityStore::new();
    store
        .create(Identity::new(
            label.to_string(),
            "field-reporter".to_string(),
            "demo-site".to_string(),
        ))
        .await?;

    let lock = LockScreen::new(service, store);

    if !lock.is_biometrics_available().await {
        println!("no biometric capability; use the password path");
        return Ok(());
    }

    let credential = lock.enroll(label).await?;
    println!("enrolled credential {}", credential.credential_id);

    println!("locked; waiting for the auto-triggered scan...");
    match lock.auto_trigger(label).await {
        LockState::Success => println!("unlocked"),
        LockState::Failed(reason) => println!("unlock failed: {reason}"),
        state => println!("unexpected lock state: {state:?}"),
    }

    Ok(())
}
