//! Resolution of the keys used for one audit pass.

use std::sync::Arc;

use supaudit_core::{AuditError, ProjectCredential, Result, SecretKey};
use tracing::{debug, info, warn};

use crate::crypto::CryptoBox;
use crate::repository::Repository;
use crate::service::{ProjectSession, ServiceApi};

/// Keys and session produced by [`CredentialResolver::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    /// Session bound to the management key and the project role key
    pub session: ProjectSession,

    /// Stored credential record, used to link audit entries
    pub credential: ProjectCredential,

    /// Whether the record was created by this resolution
    pub created: bool,
}

/// Turns a project reference and an optional supplied key into a session.
pub struct CredentialResolver {
    repository: Arc<dyn Repository>,
    crypto: Arc<CryptoBox>,
    api: Arc<dyn ServiceApi>,
}

impl CredentialResolver {
    pub fn new(
        repository: Arc<dyn Repository>,
        crypto: Arc<CryptoBox>,
        api: Arc<dyn ServiceApi>,
    ) -> Self {
        Self {
            repository,
            crypto,
            api,
        }
    }

    /// Resolve the active access key for `project_ref`.
    ///
    /// A stored credential takes precedence over `supplied`; a supplied key
    /// is only persisted when nothing is stored yet. An empty supplied key
    /// counts as absent.
    pub async fn resolve(
        &self,
        project_ref: &str,
        supplied: Option<SecretKey>,
    ) -> Result<ResolvedCredential> {
        validate_project_ref(project_ref)?;
        let supplied = supplied.filter(|key| !key.is_empty());

        let (access_key, role_key, credential, created) =
            match (self.repository.find_credential(project_ref).await?, supplied) {
                (None, None) => return Err(AuditError::MissingCredential),
                (None, Some(key)) => {
                    // A key the upstream rejects is never stored
                    let role_key = self.role_key(project_ref, &key).await?;
                    let token = self.crypto.encrypt(key.expose())?;
                    let credential = self
                        .repository
                        .create_credential(ProjectCredential::new(project_ref, token))
                        .await?;
                    info!(project_ref, "stored new project credential");
                    (key, role_key, credential, true)
                }
                (Some(credential), supplied) => {
                    let stored = SecretKey::new(self.crypto.decrypt(&credential.encrypted_access_key)?);
                    if supplied.is_some_and(|key| key != stored) {
                        warn!(project_ref, "ignoring supplied access key, stored credential takes precedence");
                    }
                    let role_key = self.role_key(project_ref, &stored).await?;
                    (stored, role_key, credential, false)
                }
            };

        Ok(ResolvedCredential {
            session: ProjectSession::new(project_ref, access_key, role_key, Arc::clone(&self.api)),
            credential,
            created,
        })
    }

    async fn role_key(&self, project_ref: &str, access_key: &SecretKey) -> Result<SecretKey> {
        let role_key = self
            .api
            .resolve_service_role_key(project_ref, access_key)
            .await?;
        debug!(project_ref, "resolved service role key");
        Ok(role_key)
    }
}

/// Reject references that could not name a project.
pub fn validate_project_ref(project_ref: &str) -> Result<()> {
    if project_ref.is_empty() {
        return Err(AuditError::InvalidInput("project reference is empty".into()));
    }
    if !project_ref
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(AuditError::InvalidInput(format!(
            "project reference {project_ref:?} may only contain letters, digits and hyphens"
        )));
    }
    Ok(())
}
