use supaudit_core::{AuditLogEntry, PitrResult, Result};
use tracing::info;
use uuid::Uuid;

use crate::audit_log::AuditLogger;
use crate::service::ProjectSession;

pub const PITR_EVENT: &str = "Database Point in Time Recovery Check";

pub const PITR_HINT: &str = "Please go to the project dashboard and enable PITR";

/// Dashboard page where PITR is enabled for a project
pub fn pitr_dashboard_url(project_ref: &str) -> String {
    format!("https://supabase.com/dashboard/project/{project_ref}/database/backups/pitr")
}

/// Verifies that point-in-time recovery is enabled.
#[derive(Clone)]
pub struct PitrChecker {
    logger: AuditLogger,
}

impl PitrChecker {
    pub const fn new(logger: AuditLogger) -> Self {
        Self { logger }
    }

    pub async fn run(&self, session: &ProjectSession, project_id: Uuid) -> Result<PitrResult> {
        let config = session.backup_config().await?;
        info!(
            project_ref = session.project_ref(),
            pitr_enabled = config.pitr_enabled,
            "pitr check complete"
        );

        let entry = AuditLogEntry::new(project_id, PITR_EVENT).log_message("PITR Check Run");

        if config.pitr_enabled {
            self.logger
                .record(
                    entry
                        .counts(1, 0)
                        .suggested_help("No action needed")
                        .message("PITR already enabled"),
                )
                .await?;
            return Ok(PitrResult {
                enabled: true,
                resolution_hint: None,
                doc_link: None,
            });
        }

        let dashboard = pitr_dashboard_url(session.project_ref());
        self.logger
            .record(
                entry
                    .counts(0, 1)
                    .suggested_help(format!(
                        "Can go to the project dashboard and enable PITR -> {dashboard}"
                    ))
                    .message("PITR is disabled"),
            )
            .await?;

        Ok(PitrResult {
            enabled: false,
            resolution_hint: Some(PITR_HINT.to_string()),
            doc_link: Some(dashboard),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seeded_logger, session, FakeApi};
    use std::sync::Arc;
    use supaudit_core::AuditError;

    #[tokio::test]
    async fn disabled_pitr_reports_hint_and_link() {
        let (repo, logger, project_id) = seeded_logger().await;
        let api = Arc::new(FakeApi::default());

        let result = PitrChecker::new(logger)
            .run(&session(api), project_id)
            .await
            .unwrap();

        assert!(!result.enabled);
        assert_eq!(result.resolution_hint.as_deref(), Some(PITR_HINT));
        assert_eq!(
            result.doc_link.as_deref(),
            Some("https://supabase.com/dashboard/project/abc123/database/backups/pitr")
        );

        let entries = repo.all_audit_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, PITR_EVENT);
        assert_eq!((entries[0].success_count, entries[0].failure_count), (0, 1));
        assert!(entries[0].suggested_help.contains("/project/abc123/"));
    }

    #[tokio::test]
    async fn enabled_pitr_has_no_hint() {
        let (repo, logger, project_id) = seeded_logger().await;
        let api = Arc::new(FakeApi {
            pitr_enabled: true,
            ..FakeApi::default()
        });

        let result = PitrChecker::new(logger)
            .run(&session(api), project_id)
            .await
            .unwrap();

        assert_eq!(
            result,
            PitrResult {
                enabled: true,
                resolution_hint: None,
                doc_link: None,
            }
        );

        let entries = repo.all_audit_entries().await;
        assert_eq!((entries[0].success_count, entries[0].failure_count), (1, 0));
        assert_eq!(entries[0].message.as_deref(), Some("PITR already enabled"));
    }

    #[tokio::test]
    async fn upstream_failure_writes_nothing() {
        let (repo, logger, project_id) = seeded_logger().await;
        let api = Arc::new(FakeApi {
            backup_status: Some(500),
            ..FakeApi::default()
        });

        let err = PitrChecker::new(logger)
            .run(&session(api), project_id)
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::ServiceCall { .. }));
        assert!(repo.all_audit_entries().await.is_empty());
    }
}
