//! txscope CLI - run nested transaction propagation scenarios.
//!
//! - `txscope scenario a|b|c|all` - run the predefined scenarios
//! - `txscope join USERNAME MESSAGE [--mode v1|v2|unscoped]` - sign a member up
//!
//! Exit code is 0 when every run behaved as it should have for its input,
//! which for scenarios B and C means failing.

mod commands;
mod format;
mod parse;
mod scenarios;

use std::process;

use tracing_subscriber::EnvFilter;
use txscope::CoordinatorConfig;

use commands::build_cli;
use format::{format_report, OutputMode};
use parse::{matches_to_action, CliAction};
use scenarios::{run_join, run_scenario, Scenario};

fn main() {
    let matches = build_cli().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    init_logging(&config);

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let exit_code = match matches_to_action(&matches) {
        Ok(CliAction::Scenarios(scenarios)) => {
            let mut code = 0;
            for scenario in scenarios {
                let report = run_scenario(&config, scenario);
                println!("{}", format_report(&report, output_mode));
                let expected_success = scenario == Scenario::A;
                if report.is_success() != expected_success {
                    code = 1;
                }
            }
            code
        }
        Ok(CliAction::Join {
            username,
            message,
            mode,
        }) => {
            let report = run_join(&config, &username, &message, mode);
            println!("{}", format_report(&report, output_mode));
            if report.is_success() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            2
        }
    };
    process::exit(exit_code);
}

fn load_config(matches: &clap::ArgMatches) -> Result<CoordinatorConfig, String> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => CoordinatorConfig::from_file(path).map_err(|e| e.to_string())?,
        None => CoordinatorConfig::default(),
    };
    if let Some(trigger) = matches.get_one::<String>("trigger") {
        config.trigger_value = trigger.clone();
    }
    Ok(config)
}

fn init_logging(config: &CoordinatorConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
