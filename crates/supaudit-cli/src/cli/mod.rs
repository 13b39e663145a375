//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;

use crate::config::Config;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load()?;
    let ctx = commands::Context::resolve(&cli, &config);

    match cli.command {
        Commands::Audit(args) => commands::audit::execute(ctx, args).await,
        Commands::Logs(args) => commands::logs::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args),
    }
}
