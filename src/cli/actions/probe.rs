use crate::authenticator::SoftAuthenticator;
use crate::biometrics::{BiometricsConfig, BiometricsService};
use anyhow::Result;

/// Probe the (software) platform authenticator and report availability.
///
/// # Errors
/// Returns error if the configuration is invalid.
pub async fn execute(rp_id: &str, rp_name: &str) -> Result<()> {
    let config = BiometricsConfig::from_env(rp_id, rp_name)?;
    let service = BiometricsService::new(config, SoftAuthenticator::new());

    if service.is_available().await {
        println!(
            "biometric authenticator available (rp id: {})",
            service.config().rp_id()
        );
    } else {
        println!("no user-verifying platform authenticator; falling back to password login");
    }

    Ok(())
}
