use crate::cli::actions::Action;
use anyhow::{anyhow, Result};

/// Map parsed arguments to an [`Action`].
///
/// # Errors
/// Returns error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let rp_id = matches
        .get_one::<String>("rp-id")
        .map(|s: &String| s.to_string())
        .ok_or_else(|| anyhow!("missing required argument: --rp-id"))?;

    let rp_name = matches
        .get_one::<String>("rp-name")
        .map(|s: &String| s.to_string())
        .ok_or_else(|| anyhow!("missing required argument: --rp-name"))?;

    let label = |sub: &clap::ArgMatches| -> Result<String> {
        sub.get_one::<String>("label")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow!("missing required argument: --label"))
    };

    match matches.subcommand() {
        Some(("probe", _)) => Ok(Action::Probe { rp_id, rp_name }),
        Some(("enroll", sub)) => Ok(Action::Enroll {
            rp_id,
            rp_name,
            label: label(sub)?,
        }),
        Some(("login", sub)) => Ok(Action::Login {
            rp_id,
            rp_name,
            label: label(sub)?,
        }),
        _ => Err(anyhow!("missing subcommand")),
    }
}
