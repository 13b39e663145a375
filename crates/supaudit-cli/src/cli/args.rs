//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Audit a Supabase project's security posture
///
/// Checks that auth users have MFA enrolled, that point-in-time recovery is
/// enabled, and that every public table has row-level security.
///
/// Create a management access token at: https://supabase.com/dashboard/account/tokens
#[derive(Parser, Debug)]
#[command(name = "supaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Explain what this command does (educational mode)
    #[arg(long, global = true)]
    pub explain: bool,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Credential and audit-trail store (JSON file)
    #[arg(long, env = "SUPAUDIT_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Passphrase used to encrypt stored access keys
    #[arg(long, env = "SUPAUDIT_PASSPHRASE", global = true, hide_env_values = true)]
    pub passphrase: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run MFA, PITR and RLS checks against a project
    Audit(AuditArgs),

    /// Show the audit trail of a project
    Logs(LogsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Audit command
// ============================================================================

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Project reference (the subdomain of <ref>.supabase.co)
    pub project_ref: String,

    /// Management access token; only stored if the project is new
    #[arg(short = 'k', long, env = "SUPABASE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Enable row level security on every public table that lacks it
    #[arg(long)]
    pub remediate: bool,

    /// Concurrent MFA factor lookups
    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    /// Exit with an error if any check finds a deficiency
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Logs command
// ============================================================================

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Project reference
    pub project_ref: String,

    /// Show at most this many entries
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (e.g., access_key, output_format)
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the configuration file path
    Path,
}
