// src/bin/themeship.rs

use clap::Parser;
use colored::*;
use themeship::{
    cli::{Cli, handlers},
    core::planner::PlanError,
};

/// Exit code when no theme qualifies as a deployment base.
const EXIT_NO_DEPLOYABLE_BASE: i32 = 2;

/// Maps `-v` occurrences to a default log filter. `RUST_LOG` still takes precedence.
fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// The main entry point of the `themeship` application.
/// It sets up logging, parses arguments, runs the deployment and performs centralized
/// error handling.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(cli.verbose)),
    )
    .init();
    log::debug!("CLI args parsed: {:?}", cli);

    match handlers::deploy::handle(cli).await {
        Ok(outcome) => handlers::deploy::report_outcome(&outcome),
        Err(e) => {
            // --- Centralized Error Handling ---
            // No deployable base is a distinct, expected failure: the run cannot proceed and
            // the workspace is left as it is.
            let code = match e.downcast_ref::<PlanError>() {
                Some(PlanError::NoDeployableBase) => EXIT_NO_DEPLOYABLE_BASE,
                _ => 1,
            };
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
            std::process::exit(code);
        }
    }
}
