use async_trait::async_trait;
use supaudit_core::{AuditLogEntry, ProjectCredential, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Repository, StoreDocument};

/// In-process repository, lost on drop.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<StoreDocument>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing credentials, bypassing the uniqueness check.
    #[must_use]
    pub fn with_credentials(credentials: Vec<ProjectCredential>) -> Self {
        Self {
            state: RwLock::new(StoreDocument {
                credentials,
                audit_log: Vec::new(),
            }),
        }
    }

    /// Number of stored credentials
    pub async fn credential_count(&self) -> usize {
        self.state.read().await.credentials.len()
    }

    /// Every audit entry across all projects, in insertion order
    pub async fn all_audit_entries(&self) -> Vec<AuditLogEntry> {
        self.state.read().await.audit_log.clone()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_credential(&self, project_ref: &str) -> Result<Option<ProjectCredential>> {
        self.state.read().await.find_credential(project_ref)
    }

    async fn create_credential(&self, credential: ProjectCredential) -> Result<ProjectCredential> {
        self.state.write().await.insert_credential(credential)
    }

    async fn append_audit_entry(&self, entry: AuditLogEntry) -> Result<()> {
        self.state.write().await.append_entry(entry)
    }

    async fn list_audit_entries(&self, project_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        Ok(self.state.read().await.entries_for(project_id))
    }
}
