//! Credential and audit-trail storage.
//!
//! The engine never reaches for a global store: every component receives an
//! `Arc<dyn Repository>`. Credential lookup is "exactly one or none"; a
//! duplicate record for one project reference is a persistence error.

mod file;
mod memory;

pub use file::FileRepository;
pub use memory::MemoryRepository;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use supaudit_core::{AuditError, AuditLogEntry, ProjectCredential, Result};
use uuid::Uuid;

/// Storage operations the engine depends on.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Find the credential stored for a project reference.
    async fn find_credential(&self, project_ref: &str) -> Result<Option<ProjectCredential>>;

    /// Store a new credential. Fails if one already exists for the reference.
    async fn create_credential(&self, credential: ProjectCredential) -> Result<ProjectCredential>;

    /// Append an audit entry. The referenced credential must exist.
    async fn append_audit_entry(&self, entry: AuditLogEntry) -> Result<()>;

    /// All audit entries of a credential, in insertion order.
    async fn list_audit_entries(&self, project_id: Uuid) -> Result<Vec<AuditLogEntry>>;
}

/// Serializable state shared by the repository implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreDocument {
    #[serde(default)]
    pub credentials: Vec<ProjectCredential>,
    #[serde(default)]
    pub audit_log: Vec<AuditLogEntry>,
}

impl StoreDocument {
    pub fn find_credential(&self, project_ref: &str) -> Result<Option<ProjectCredential>> {
        let mut matches = self
            .credentials
            .iter()
            .filter(|c| c.project_ref == project_ref);

        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(found), None) => Ok(Some(found.clone())),
            (Some(_), Some(_)) => Err(AuditError::Persistence(format!(
                "duplicate credentials stored for project {project_ref}"
            ))),
        }
    }

    pub fn insert_credential(&mut self, credential: ProjectCredential) -> Result<ProjectCredential> {
        if self
            .credentials
            .iter()
            .any(|c| c.project_ref == credential.project_ref)
        {
            return Err(AuditError::Persistence(format!(
                "credential already exists for project {}",
                credential.project_ref
            )));
        }
        self.credentials.push(credential.clone());
        Ok(credential)
    }

    pub fn append_entry(&mut self, entry: AuditLogEntry) -> Result<()> {
        if !self.credentials.iter().any(|c| c.id == entry.project_id) {
            return Err(AuditError::Persistence(format!(
                "audit entry references unknown project {}",
                entry.project_id
            )));
        }
        self.audit_log.push(entry);
        Ok(())
    }

    pub fn entries_for(&self, project_id: Uuid) -> Vec<AuditLogEntry> {
        self.audit_log
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_credentials_are_an_error() {
        let doc = StoreDocument {
            credentials: vec![
                ProjectCredential::new("abc123", "t1"),
                ProjectCredential::new("abc123", "t2"),
            ],
            audit_log: Vec::new(),
        };
        assert!(matches!(
            doc.find_credential("abc123"),
            Err(AuditError::Persistence(_))
        ));
    }

    #[test]
    fn insert_rejects_existing_reference() {
        let mut doc = StoreDocument::default();
        doc.insert_credential(ProjectCredential::new("abc123", "t1"))
            .unwrap();
        assert!(doc
            .insert_credential(ProjectCredential::new("abc123", "t2"))
            .is_err());
        assert_eq!(doc.credentials.len(), 1);
    }

    #[test]
    fn entries_require_known_project() {
        let mut doc = StoreDocument::default();
        let entry = AuditLogEntry::new(Uuid::new_v4(), "User MFA Check");
        assert!(matches!(
            doc.append_entry(entry),
            Err(AuditError::Persistence(_))
        ));
    }
}
