//! plancheck entry point.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use plancheck::args::{Cli, Command};
use plancheck::commands::{self, openai_provider};
use plancheck::config::{FileConfig, Settings};
use plancheck::observability;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(file, cli.overrides())?;
    let _telemetry = observability::init(cli.verbose, settings.log_format)
        .context("failed to initialise logging")?;

    tracing::debug!(model = %settings.provider.model, base_url = %settings.provider.base_url, json_mode = settings.json_mode, "Settings resolved");
    let reviewer = settings.reviewer(openai_provider(&settings.provider)?);

    let stdout = io::stdout();
    match &cli.command {
        Command::Analyze(args) => {
            let stdin = io::stdin();
            commands::analyze::run(args, reviewer, &mut stdin.lock(), &mut stdout.lock()).await?;
        }
        Command::Agent(args) => {
            commands::agent::run(args, &settings.agent, reviewer, &mut stdout.lock()).await?;
        }
    }
    Ok(())
}
