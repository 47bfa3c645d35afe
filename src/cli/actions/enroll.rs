use crate::authenticator::SoftAuthenticator;
use crate::biometrics::{BiometricsConfig, BiometricsService};
use crate::identity::{valid_label, Identity, IdentityStore, MemoryIdentityStore};
use anyhow::{anyhow, Result};

/// Enroll a credential for a demo profile and print the stored reference.
///
/// Runs against the in-process software authenticator and an in-memory
/// profile store; the real application wires its own implementations of
/// both boundaries.
///
/// # Errors
/// Returns error if the label is invalid or enrollment fails.
pub async fn execute(rp_id: &str, rp_name: &str, label: &str) -> Result<()> {
    if !valid_label(label) {
        return Err(anyhow!("Invalid profile name: {label}"));
    }

    let config = BiometricsConfig::from_env(rp_id, rp_name)?;
    let service = BiometricsService::new(config, SoftAuthenticator::new());
    let store = MemoryIdentityStore::new();

    let identity = Identity::new(
        label.to_string(),
        "field-reporter".to_string(),
        "demo-site".to_string(),
    );
    let identity_id = identity.id;
    store.create(identity).await?;

    let credential = service.enroll(label).await?;
    store.update_credential(identity_id, credential.clone()).await?;

    println!("enrolled profile: {label}");
    println!("{}", serde_json::to_string_pretty(&credential)?);

    Ok(())
}
