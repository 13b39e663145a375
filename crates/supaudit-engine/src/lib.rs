//! # supaudit-engine
//!
//! Check orchestration for a hosted database project's security posture.
//!
//! ## Data Flow
//!
//! ```text
//! project ref + optional access key
//!   -> CredentialResolver (stored credential wins; new keys are encrypted and stored)
//!   -> management API: access key -> service-role key
//!   -> ProjectSession
//!   -> MfaChecker   (users without factors)        -> audit entry
//!   -> PitrChecker  (backup config)                -> audit entry
//!   -> RlsChecker   (pg_class introspection,
//!                    optional remediation DDL)     -> audit entry
//!   -> AuditReport
//! ```
//!
//! Any failure aborts the pass; there is no partial report.

pub mod audit_log;
pub mod checks;
pub mod credentials;
pub mod crypto;
pub mod orchestrator;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testing;

pub use audit_log::AuditLogger;
pub use checks::{MfaChecker, PitrChecker, RemediationPolicy, RlsChecker};
pub use credentials::{validate_project_ref, CredentialResolver, ResolvedCredential};
pub use crypto::CryptoBox;
pub use orchestrator::{AuditOptions, CheckOrchestrator};
pub use repository::{FileRepository, MemoryRepository, Repository};
pub use service::{ProjectSession, ServiceApi};
pub use supaudit_core::{AuditError, Result};
