//! ArgMatches → CliAction conversion.

use clap::ArgMatches;

use crate::scenarios::{JoinMode, Scenario};

/// The action requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Run one or more predefined scenarios
    Scenarios(Vec<Scenario>),
    /// Run one sign-up through MemberService
    Join {
        /// Member username
        username: String,
        /// Audit log message
        message: String,
        /// How the service composes its scopes
        mode: JoinMode,
    },
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "scenario" => {
            let name = required(sub_matches, "name")?;
            let scenarios = match name.as_str() {
                "a" => vec![Scenario::A],
                "b" => vec![Scenario::B],
                "c" => vec![Scenario::C],
                "all" => vec![Scenario::A, Scenario::B, Scenario::C],
                other => return Err(format!("Unknown scenario: {}", other)),
            };
            Ok(CliAction::Scenarios(scenarios))
        }
        "join" => {
            let mode = match required(sub_matches, "mode")?.as_str() {
                "v1" => JoinMode::Propagate,
                "v2" => JoinMode::Catch,
                "unscoped" => JoinMode::Unscoped,
                other => return Err(format!("Unknown join mode: {}", other)),
            };
            Ok(CliAction::Join {
                username: required(sub_matches, "username")?,
                message: required(sub_matches, "message")?,
                mode,
            })
        }
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", name))
}
