use serde::Deserialize;
use supaudit_core::{AuditError, AuditLogEntry, Result, RlsResult, RlsViolation};
use tracing::{info, warn};
use uuid::Uuid;

use super::count;
use crate::audit_log::AuditLogger;
use crate::service::ProjectSession;

pub const RLS_EVENT: &str = "Table RLS Checks";

/// Every ordinary table of the `public` schema with its RLS flags.
pub const RLS_INTROSPECTION_SQL: &str = "select relname, relrowsecurity, relforcerowsecurity \
     from pg_class \
     join pg_catalog.pg_namespace n on n.oid = pg_class.relnamespace \
     where n.nspname = 'public' and relkind = 'r';";

const HINT_PENDING: &str = "Run the following command on your Supabase SQL Editor to enable RLS";

const HINT_APPLIED: &str =
    "System has run the following command on your Supabase SQL Editor to enable RLS";

/// Whether detected violations are fixed in the same pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemediationPolicy {
    /// Only report violations
    #[default]
    ReportOnly,
    /// Execute the remediation statement for every violation
    Apply,
}

/// RLS state of one public table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableRls {
    #[serde(rename = "relname")]
    pub table_name: String,
    #[serde(rename = "relrowsecurity")]
    pub rls_enabled: bool,
}

/// Read-only outcome of [`RlsChecker::evaluate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RlsEvaluation {
    /// Public tables inspected, with or without RLS
    pub total_tables: usize,
    pub violations: Vec<RlsViolation>,
}

/// Statement enabling row-level security on a public table.
///
/// Plain lowercase identifiers are emitted bare; anything else is quoted.
pub fn remediation_command(table_name: &str) -> String {
    format!(
        "alter table {} enable row level security;",
        quote_ident(table_name)
    )
}

fn quote_ident(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$');

    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Detects public tables without row-level security and optionally fixes them.
#[derive(Clone)]
pub struct RlsChecker {
    logger: AuditLogger,
}

impl RlsChecker {
    pub const fn new(logger: AuditLogger) -> Self {
        Self { logger }
    }

    /// Introspect the public schema. Never mutates the database.
    pub async fn evaluate(&self, session: &ProjectSession) -> Result<RlsEvaluation> {
        let rows = session.run_sql(RLS_INTROSPECTION_SQL).await?;
        let tables = rows
            .into_iter()
            .map(|row| {
                serde_json::from_value::<TableRls>(row)
                    .map_err(|e| AuditError::Query(format!("unexpected pg_class row: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let violations = tables
            .iter()
            .filter(|t| !t.rls_enabled)
            .map(|t| RlsViolation {
                table_name: t.table_name.clone(),
                rls_enabled: false,
                resolution_hint: HINT_PENDING.to_string(),
                remediation_command: remediation_command(&t.table_name),
            })
            .collect();

        Ok(RlsEvaluation {
            total_tables: tables.len(),
            violations,
        })
    }

    /// Execute each violation's remediation statement once, in order.
    ///
    /// Stops at the first failing statement; hints of tables fixed before
    /// the failure are not rewritten because the pass is aborted anyway.
    pub async fn remediate(
        &self,
        session: &ProjectSession,
        violations: &mut [RlsViolation],
    ) -> Result<usize> {
        for violation in violations.iter_mut() {
            warn!(
                project_ref = session.project_ref(),
                table = %violation.table_name,
                "enabling row level security"
            );
            session.run_sql(&violation.remediation_command).await?;
            violation.resolution_hint = HINT_APPLIED.to_string();
        }
        Ok(violations.len())
    }

    /// Evaluate, remediate according to `policy`, and record the outcome.
    pub async fn run(
        &self,
        session: &ProjectSession,
        project_id: Uuid,
        policy: RemediationPolicy,
    ) -> Result<RlsResult> {
        let RlsEvaluation {
            total_tables,
            mut violations,
        } = self.evaluate(session).await?;

        let remediated = if policy == RemediationPolicy::Apply && !violations.is_empty() {
            self.remediate(session, &mut violations).await?;
            true
        } else {
            false
        };

        let failed = violations.len();
        let succeeded = total_tables - failed;
        info!(
            project_ref = session.project_ref(),
            total = total_tables,
            violations = failed,
            remediated,
            "rls check complete"
        );

        let (help, message) = match (failed, remediated) {
            (0, _) => (
                "No action needed".to_string(),
                "Tables have RLS already enabled",
            ),
            (_, true) => (
                "Ran \"alter table <table_name> enable row level security;\" for all missing tables"
                    .to_string(),
                "Please enable RLS checks and its policies",
            ),
            (_, false) => (
                "Run \"alter table <table_name> enable row level security;\" for all missing tables"
                    .to_string(),
                "Please enable RLS checks and its policies",
            ),
        };

        self.logger
            .record(
                AuditLogEntry::new(project_id, RLS_EVENT)
                    .counts(count(succeeded), count(failed))
                    .suggested_help(help)
                    .message(message)
                    .log_message("RLS Checks Run"),
            )
            .await?;

        Ok(RlsResult {
            violations,
            remediated,
        })
    }
}
