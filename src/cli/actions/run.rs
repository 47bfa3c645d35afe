use crate::cli::actions::{enroll, login, probe, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
// To add a new action, add a new `Action::*` variant and a corresponding `*::execute` call here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Probe { rp_id, rp_name } => probe::execute(&rp_id, &rp_name).await,
        Action::Enroll {
            rp_id,
            rp_name,
            label,
        } => enroll::execute(&rp_id, &rp_name, &label).await,
        Action::Login {
            rp_id,
            rp_name,
            label,
        } => login::execute(&rp_id, &rp_name, &label).await,
    }
}
