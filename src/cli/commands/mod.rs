use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn label_arg() -> Arg {
    Arg::new("label")
        .short('l')
        .long("label")
        .help("Profile name the credential is bound to")
        .required(true)
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("aliro")
        .about("Local biometric authentication for safety incident reporting")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("rp-id")
                .long("rp-id")
                .help("Relying-party identifier (bare host); credentials are not portable across hosts")
                .default_value("sentinela.local")
                .env("ALIRO_RP_ID")
                .global(true),
        )
        .arg(
            Arg::new("rp-name")
                .long("rp-name")
                .help("Human-readable service name shown in platform prompts")
                .default_value("Sentinela")
                .env("ALIRO_RP_NAME")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("ALIRO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("probe")
                .about("Check whether a user-verifying platform authenticator is available"),
        )
        .subcommand(
            Command::new("enroll")
                .about("Enroll a biometric credential for a profile and print the stored reference")
                .arg(label_arg()),
        )
        .subcommand(
            Command::new("login")
                .about("Walk the full lock-screen flow: enroll, auto-trigger, unlock")
                .arg(label_arg()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "aliro");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Local biometric authentication for safety incident reporting"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_rp_and_label() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "aliro",
            "--rp-id",
            "reports.example.com",
            "enroll",
            "--label",
            "Alice",
        ]);

        assert_eq!(
            matches.get_one::<String>("rp-id").map(|s| s.to_string()),
            Some("reports.example.com".to_string())
        );

        let (name, sub) = matches.subcommand().expect("subcommand required");
        assert_eq!(name, "enroll");
        assert_eq!(
            sub.get_one::<String>("label").map(|s| s.to_string()),
            Some("Alice".to_string())
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("ALIRO_RP_ID", Some("reports.example.com")),
                ("ALIRO_RP_NAME", Some("Reports")),
                ("ALIRO_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["aliro", "probe"]);
                assert_eq!(
                    matches.get_one::<String>("rp-id").map(|s| s.to_string()),
                    Some("reports.example.com".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("rp-name").map(|s| s.to_string()),
                    Some("Reports".to_string())
                );
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("ALIRO_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["aliro".to_string(), "probe".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_defaults() {
        let command = new();
        let matches = command.get_matches_from(vec!["aliro", "probe"]);
        assert_eq!(
            matches.get_one::<String>("rp-id").map(|s| s.to_string()),
            Some("sentinela.local".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("rp-name").map(|s| s.to_string()),
            Some("Sentinela".to_string())
        );
    }
}
