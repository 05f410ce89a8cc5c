//! Clap command tree for the txscope CLI.

use clap::{Arg, ArgAction, Command};

/// Build the top-level command.
pub fn build_cli() -> Command {
    Command::new("txscope")
        .about("Run nested transaction propagation scenarios against an in-memory store")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("trigger")
                .long("trigger")
                .value_name("VALUE")
                .help("Record content the store rejects (overrides the config file)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print reports as JSON"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("scenario")
                .about("Run a predefined propagation scenario")
                .arg(
                    Arg::new("name")
                        .required(true)
                        .value_parser(["a", "b", "c", "all"])
                        .help("a: flat commit, b: inner failure propagates, c: inner failure caught"),
                ),
        )
        .subcommand(
            Command::new("join")
                .about("Sign a member up through MemberService")
                .arg(Arg::new("username").required(true))
                .arg(Arg::new("message").required(true))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_parser(["v1", "v2", "unscoped"])
                        .default_value("v1")
                        .help("v1: propagate log failure, v2: catch it, unscoped: no outer transaction"),
                ),
        )
}
