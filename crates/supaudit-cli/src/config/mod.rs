//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::output::OutputFormat;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SUPAUDIT_CONFIG";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Management access token used when none is passed on the command line.
    pub access_key: Option<String>,

    /// Passphrase for encrypting stored access keys.
    pub encryption_passphrase: Option<String>,

    /// Credential and audit-trail store. `~` is expanded.
    pub store_path: Option<String>,

    /// Management API base URL.
    pub management_url: Option<String>,

    /// Per-project API URL; `{ref}` is replaced by the project reference.
    pub project_url: Option<String>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Always show explanations (as if --explain was passed).
    #[serde(default)]
    pub explain_by_default: bool,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "supaudit", "supaudit")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

        Ok(())
    }

    /// Set a value by key name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "access_key" => self.access_key = Some(value.to_string()),
            "encryption_passphrase" | "passphrase" => {
                self.encryption_passphrase = Some(value.to_string());
            }
            "store_path" | "store" => self.store_path = Some(value.to_string()),
            "management_url" => self.management_url = Some(value.to_string()),
            "project_url" => self.project_url = Some(value.to_string()),
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "explain_by_default" | "explain" => self.explain_by_default = value.parse()?,
            _ => {
                anyhow::bail!(
                    "Unknown config key: {}\n\n\
                     Available keys:\n  \
                     access_key            - Supabase management access token\n  \
                     encryption_passphrase - Passphrase for stored access keys\n  \
                     store_path            - Credential and audit-trail store\n  \
                     management_url        - Management API base URL\n  \
                     project_url           - Project API URL template with {{ref}}\n  \
                     output_format         - Default output format (pretty/json/csv/yaml)\n  \
                     explain_by_default    - Always explain commands (true/false)",
                    key
                );
            }
        }
        Ok(())
    }

    /// Resolved store location: configured path or the platform data directory.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
            None => Ok(project_dirs()?.data_dir().join("store.json")),
        }
    }
}

/// Shorten a secret for display.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("access_key", "sbp_0123456789").unwrap();
        config.set("output", "json").unwrap();
        config.set("explain", "true").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.access_key.as_deref(), Some("sbp_0123456789"));
        assert_eq!(loaded.output_format, Some(OutputFormat::Json));
        assert!(loaded.explain_by_default);
    }

    #[test]
    fn rejects_unknown_key_and_bad_values() {
        let mut config = Config::default();
        assert!(config.set("api_key", "x").is_err());
        assert!(config.set("output_format", "xml").is_err());
        assert!(config.set("explain", "maybe").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn store_path_expands_tilde() {
        let config = Config {
            store_path: Some("~/supaudit.json".into()),
            ..Config::default()
        };
        let path = config.store_path().unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("supaudit.json"));
    }

    #[test]
    fn mask_hides_short_and_long_secrets() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("sbp_0123456789abcd"), "sbp_...abcd");
    }
}
