//! One audit pass: resolve credentials, run the three checks, build the report.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use supaudit_core::{AuditLogEntry, AuditReport, Result, SecretKey};
use tracing::{error, info, instrument};

use crate::audit_log::AuditLogger;
use crate::checks::{MfaChecker, PitrChecker, RemediationPolicy, RlsChecker};
use crate::credentials::{validate_project_ref, CredentialResolver};
use crate::crypto::CryptoBox;
use crate::repository::Repository;
use crate::service::ServiceApi;

/// Per-pass options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOptions {
    /// What to do about tables without RLS
    pub remediation: RemediationPolicy,

    /// Maximum concurrent MFA factor lookups
    pub mfa_concurrency: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            remediation: RemediationPolicy::ReportOnly,
            mfa_concurrency: 4,
        }
    }
}

impl AuditOptions {
    /// Opt in to enabling RLS on every violating table
    #[must_use]
    pub const fn with_remediation(mut self) -> Self {
        self.remediation = RemediationPolicy::Apply;
        self
    }

    /// Set the MFA lookup concurrency
    #[must_use]
    pub const fn mfa_concurrency(mut self, concurrency: usize) -> Self {
        self.mfa_concurrency = concurrency;
        self
    }
}

type ProjectLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Sequences credential resolution and the three checks.
///
/// Passes for the same project reference are serialized; passes for
/// different references run independently.
pub struct CheckOrchestrator {
    resolver: CredentialResolver,
    logger: AuditLogger,
    locks: ProjectLocks,
}

impl CheckOrchestrator {
    pub fn new(repository: Arc<dyn Repository>, crypto: CryptoBox, api: Arc<dyn ServiceApi>) -> Self {
        let resolver = CredentialResolver::new(Arc::clone(&repository), Arc::new(crypto), api);
        let logger = AuditLogger::new(repository);
        Self {
            resolver,
            logger,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run one audit pass.
    ///
    /// Either all three checks succeed and a complete report is returned, or
    /// the first failure aborts the pass and is returned unchanged.
    #[instrument(skip(self, supplied_key), fields(remediation = ?options.remediation))]
    pub async fn run(
        &self,
        project_ref: &str,
        supplied_key: Option<SecretKey>,
        options: AuditOptions,
    ) -> Result<AuditReport> {
        let outcome = {
            let lease = self.lease(project_ref);
            let _guard = lease.lock.lock().await;
            self.run_pass(project_ref, supplied_key, options).await
        };

        match outcome {
            Ok(report) => {
                info!(deficiencies = report.deficiency_count(), "audit pass complete");
                Ok(report)
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "audit pass failed");
                Err(e)
            }
        }
    }

    /// Audit entries recorded for a project, newest first.
    ///
    /// A project that was never audited has no entries.
    pub async fn history(&self, project_ref: &str, limit: Option<usize>) -> Result<Vec<AuditLogEntry>> {
        validate_project_ref(project_ref)?;
        self.logger.for_project(project_ref, limit).await
    }

    async fn run_pass(
        &self,
        project_ref: &str,
        supplied_key: Option<SecretKey>,
        options: AuditOptions,
    ) -> Result<AuditReport> {
        let resolved = self.resolver.resolve(project_ref, supplied_key).await?;
        let session = &resolved.session;
        let project_id = resolved.credential.id;

        let mfa_data = MfaChecker::new(self.logger.clone())
            .concurrency(options.mfa_concurrency)
            .run(session, project_id)
            .await?;
        let pitr_data = PitrChecker::new(self.logger.clone())
            .run(session, project_id)
            .await?;
        let rls_data = RlsChecker::new(self.logger.clone())
            .run(session, project_id, options.remediation)
            .await?;

        Ok(AuditReport {
            mfa_data,
            pitr_data,
            rls_data,
        })
    }

    fn lease(&self, project_ref: &str) -> ProjectLease<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(locks.entry(project_ref.to_string()).or_default());
        ProjectLease {
            locks: &self.locks,
            project_ref: project_ref.to_string(),
            lock,
        }
    }
}

/// Claim on a project's pass lock. The map entry goes away with the last
/// claim, including when a pass is cancelled.
struct ProjectLease<'a> {
    locks: &'a ProjectLocks,
    project_ref: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for ProjectLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this lease hold it: nobody else is waiting
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.project_ref);
        }
    }
}
