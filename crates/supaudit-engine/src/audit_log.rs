//! Append-only audit trail.

use std::sync::Arc;

use supaudit_core::{AuditLogEntry, Result};
use tracing::info;
use uuid::Uuid;

use crate::repository::Repository;

/// Writes one entry per check execution and reads the trail back.
#[derive(Clone)]
pub struct AuditLogger {
    repository: Arc<dyn Repository>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Append an entry. Entries are never updated or deleted.
    pub async fn record(&self, entry: AuditLogEntry) -> Result<()> {
        info!(
            event = %entry.event,
            success = entry.success_count,
            failure = entry.failure_count,
            "recording audit entry"
        );
        self.repository.append_audit_entry(entry).await
    }

    /// Entries of a project, newest first, optionally truncated to `limit`.
    pub async fn recent(&self, project_id: Uuid, limit: Option<usize>) -> Result<Vec<AuditLogEntry>> {
        let mut entries = self.repository.list_audit_entries(project_id).await?;
        // Stable sort keeps insertion order reversed for equal timestamps
        entries.reverse();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Entries of a project looked up by reference, newest first.
    ///
    /// A project that was never audited has no entries.
    pub async fn for_project(&self, project_ref: &str, limit: Option<usize>) -> Result<Vec<AuditLogEntry>> {
        match self.repository.find_credential(project_ref).await? {
            Some(credential) => self.recent(credential.id, limit).await,
            None => Ok(Vec::new()),
        }
    }
}
