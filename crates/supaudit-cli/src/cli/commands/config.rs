//! `supaudit config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{mask, Config};
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let mut shown = ctx.config.clone();
    shown.access_key = shown.access_key.as_deref().map(mask);
    shown.encryption_passphrase = shown.encryption_passphrase.as_deref().map(mask);

    if ctx.output_format.print_structured(&shown)? {
        return Ok(());
    }

    let unset = || "(not set)".dimmed().to_string();

    println!("{}", "Current Configuration:".bold());
    println!();
    println!("  {} {}", "access_key:".bold(), shown.access_key.unwrap_or_else(unset));
    println!(
        "  {} {}",
        "encryption_passphrase:".bold(),
        shown.encryption_passphrase.unwrap_or_else(unset)
    );
    println!("  {} {}", "store_path:".bold(), ctx.store_path()?.display());
    println!(
        "  {} {}",
        "management_url:".bold(),
        shown.management_url.unwrap_or_else(unset)
    );
    println!("  {} {}", "project_url:".bold(), shown.project_url.unwrap_or_else(unset));
    println!(
        "  {} {}",
        "output_format:".bold(),
        shown.output_format.unwrap_or(OutputFormat::Pretty)
    );
    println!("  {} {}", "explain_by_default:".bold(), shown.explain_by_default);

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("{} {} updated.", "Success:".green().bold(), key.cyan());
    Ok(())
}

fn show_path() -> Result<()> {
    println!("{}", Config::path()?.display());
    Ok(())
}
