//! Command implementations.

pub mod audit;
pub mod config;
pub mod logs;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use supaudit::{CheckOrchestrator, CryptoBox, Endpoints, FileRepository, SupabaseClient};

use crate::cli::args::Cli;
use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration file
    pub config: Config,

    /// Output format
    pub output_format: OutputFormat,

    /// Whether to show educational explanations
    pub explain: bool,

    /// Verbose output
    pub verbose: bool,

    /// Store location from the command line
    pub store: Option<PathBuf>,

    /// Passphrase from the command line or environment
    pub passphrase: Option<String>,
}

impl Context {
    /// Merge command-line flags over the configuration file.
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            config: config.clone(),
            output_format: cli.output.or(config.output_format).unwrap_or_default(),
            explain: cli.explain || config.explain_by_default,
            verbose: cli.verbose,
            store: cli.store.clone(),
            passphrase: cli
                .passphrase
                .clone()
                .or_else(|| config.encryption_passphrase.clone()),
        }
    }

    /// Location of the credential and audit-trail store.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store {
            Some(path) => Ok(path.clone()),
            None => self.config.store_path(),
        }
    }

    /// Open the credential and audit-trail store.
    pub async fn repository(&self) -> Result<Arc<FileRepository>> {
        let path = self.store_path()?;
        let repository = FileRepository::open(&path)
            .await
            .with_context(|| format!("opening store {}", path.display()))?;
        Ok(Arc::new(repository))
    }

    /// Build the cipher for stored access keys.
    pub fn crypto(&self) -> Result<CryptoBox> {
        let passphrase = self
            .passphrase
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Encryption passphrase required.\n\n\
                     Set it with one of:\n  \
                     1. --passphrase <PASSPHRASE>\n  \
                     2. SUPAUDIT_PASSPHRASE environment variable\n  \
                     3. supaudit config set encryption_passphrase <PASSPHRASE>"
                )
            })?;
        Ok(CryptoBox::new(passphrase)?)
    }

    /// Create a Supabase client for the configured endpoints.
    pub fn client(&self) -> Result<Arc<SupabaseClient>> {
        let mut endpoints = Endpoints::new();
        if let Some(url) = &self.config.management_url {
            endpoints = endpoints.management_url(url);
        }
        if let Some(template) = &self.config.project_url {
            endpoints = endpoints.project_url(template);
        }

        let client = SupabaseClient::builder().endpoints(endpoints).build()?;
        Ok(Arc::new(client))
    }

    /// Wire the store, cipher and client into an orchestrator.
    pub async fn orchestrator(&self) -> Result<CheckOrchestrator> {
        let crypto = self.crypto()?;
        let client = self.client()?;
        let repository = self.repository().await?;
        Ok(CheckOrchestrator::new(repository, crypto, client))
    }
}
