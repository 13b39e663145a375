//! # supaudit-cli
//!
//! Command-line interface for auditing a Supabase project's security posture.
//!
//! ## Features
//!
//! - **Audit**: MFA coverage, PITR, and RLS in one pass, with opt-in RLS remediation
//! - **Audit trail**: list the entries recorded by previous passes
//! - **Educational mode**: `--explain` describes what a command does before running it
//! - **Multiple output formats**: Pretty tables, JSON, CSV, YAML

pub mod cli;
pub mod config;
pub mod education;
pub mod output;

pub use cli::run;
