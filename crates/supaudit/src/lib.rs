//! Audit a Supabase project's security posture.
//!
//! Three checks run in one pass: MFA coverage of auth users, point-in-time
//! recovery, and row-level security on every `public` table. Tables without
//! RLS can optionally be fixed in the same pass.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use supaudit::{AuditOptions, CheckOrchestrator, CryptoBox, FileRepository, SecretKey, SupabaseClient};
//!
//! #[tokio::main]
//! async fn main() -> supaudit::Result<()> {
//!     let repository = Arc::new(FileRepository::open("supaudit.json").await?);
//!     let crypto = CryptoBox::new("a long local passphrase")?;
//!     let client = Arc::new(SupabaseClient::new()?);
//!
//!     let orchestrator = CheckOrchestrator::new(repository, crypto, client);
//!     let report = orchestrator
//!         .run("abcdefghijklmnop", Some(SecretKey::new("sbp_...")), AuditOptions::default())
//!         .await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/supaudit/0.3.0")]

// Re-export core types
pub use supaudit_core::*;

// Re-export client
pub use supaudit_client::{Endpoints, SupabaseClient, SupabaseClientBuilder};

// Re-export engine
pub use supaudit_engine::{
    checks, validate_project_ref, AuditLogger, AuditOptions, CheckOrchestrator,
    CredentialResolver, CryptoBox, FileRepository, MemoryRepository, ProjectSession,
    RemediationPolicy, Repository, ServiceApi,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
