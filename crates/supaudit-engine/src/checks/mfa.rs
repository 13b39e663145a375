use futures_util::stream::{self, StreamExt, TryStreamExt};
use supaudit_core::{AuditLogEntry, MfaResult, Result, UserMfaStatus};
use tracing::info;
use uuid::Uuid;

use super::count;
use crate::audit_log::AuditLogger;
use crate::service::ProjectSession;

pub const MFA_EVENT: &str = "User MFA Check";

pub const MFA_HINT: &str =
    "Can enroll app users to MFA using a TOTP (Time based one time password) method";

pub const MFA_DOC_LINK: &str = "https://supabase.com/docs/guides/auth/auth-mfa";

const DEFAULT_CONCURRENCY: usize = 4;

/// Flags users with no enrolled MFA factor.
#[derive(Clone)]
pub struct MfaChecker {
    logger: AuditLogger,
    concurrency: usize,
}

impl MfaChecker {
    pub fn new(logger: AuditLogger) -> Self {
        Self {
            logger,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Maximum number of factor lookups in flight (at least one).
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(&self, session: &ProjectSession, project_id: Uuid) -> Result<MfaResult> {
        let users = session.list_users().await?;

        // `buffered` yields in input order, so output follows the user listing
        let factor_counts: Vec<usize> = stream::iter(users.clone())
            .map(|user_id| async move { session.list_mfa_factors(&user_id).await })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let unprotected_users: Vec<UserMfaStatus> = users
            .iter()
            .zip(factor_counts)
            .filter(|(_, factors)| *factors == 0)
            .map(|(user_id, _)| UserMfaStatus::unprotected(user_id.as_str()))
            .collect();

        let failed = unprotected_users.len();
        let succeeded = users.len() - failed;
        info!(
            project_ref = session.project_ref(),
            total = users.len(),
            unprotected = failed,
            "mfa check complete"
        );

        self.logger
            .record(
                AuditLogEntry::new(project_id, MFA_EVENT)
                    .counts(count(succeeded), count(failed))
                    .suggested_help(MFA_HINT)
                    .log_message("MFA Checks Run"),
            )
            .await?;

        let deficient = failed > 0;
        Ok(MfaResult {
            unprotected_users,
            resolution_hint: deficient.then(|| MFA_HINT.to_string()),
            doc_link: deficient.then(|| MFA_DOC_LINK.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seeded_logger, session, FakeApi};
    use std::sync::Arc;

    #[tokio::test]
    async fn users_without_factors_are_reported_in_order() {
        let (repo, logger, project_id) = seeded_logger().await;
        let api = Arc::new(FakeApi::with_users(&[
            ("u1", 1),
            ("u2", 0),
            ("u3", 2),
            ("u4", 0),
        ]));

        let result = MfaChecker::new(logger)
            .concurrency(3)
            .run(&session(api), project_id)
            .await
            .unwrap();

        let ids: Vec<_> = result
            .unprotected_users
            .iter()
            .map(|u| u.user_id.as_str())
            .collect();
        assert_eq!(ids, ["u2", "u4"]);
        assert!(result.unprotected_users.iter().all(|u| !u.mfa_enabled));
        assert_eq!(result.resolution_hint.as_deref(), Some(MFA_HINT));
        assert_eq!(result.doc_link.as_deref(), Some(MFA_DOC_LINK));

        let entries = repo.all_audit_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, MFA_EVENT);
        assert_eq!(entries[0].success_count, 2);
        assert_eq!(entries[0].failure_count, 2);
        assert_eq!(entries[0].total(), 4);
    }

    #[tokio::test]
    async fn fully_protected_project_has_no_hint() {
        let (repo, logger, project_id) = seeded_logger().await;
        let api = Arc::new(FakeApi::with_users(&[("u1", 1), ("u2", 3)]));

        let result = MfaChecker::new(logger)
            .run(&session(api), project_id)
            .await
            .unwrap();

        assert!(result.is_clean());
        assert!(result.resolution_hint.is_none());
        assert!(result.doc_link.is_none());

        let entries = repo.all_audit_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].success_count, 2);
        assert_eq!(entries[0].failure_count, 0);
    }

    #[tokio::test]
    async fn no_users_still_writes_entry() {
        let (repo, logger, project_id) = seeded_logger().await;
        let api = Arc::new(FakeApi::default());

        let result = MfaChecker::new(logger)
            .run(&session(api), project_id)
            .await
            .unwrap();

        assert!(result.is_clean());
        assert_eq!(repo.all_audit_entries().await[0].total(), 0);
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let logger = AuditLogger::new(Arc::new(crate::repository::MemoryRepository::new()));
        assert_eq!(MfaChecker::new(logger).concurrency(0).concurrency, 1);
    }
}
