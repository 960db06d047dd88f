use std::process::ExitCode;

use clap::Parser;

mod backup;
mod cli;
mod commands;
mod config;
mod db;
mod error;
mod shell;
mod state;
mod users;

use crate::cli::Cli;
use crate::state::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "mysqlops=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    // stdout carries command output; logs go to stderr.
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let state = AppState::init()?;
    tracing::debug!(config = ?state.config, "configuration loaded");

    Ok(exit_code(commands::run(&state, cli.command).await))
}

/// Logs a failed command once and turns it into a non-zero exit.
fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), kind = error::kind(&e), "command failed");
            ExitCode::FAILURE
        }
    }
}
