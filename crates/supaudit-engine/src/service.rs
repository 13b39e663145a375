//! The remote operations the checks depend on, and the per-pass session.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use supaudit_client::SupabaseClient;
use supaudit_core::{BackupConfig, Result, SecretKey};

/// Remote operations consumed by the credential resolver and the checks.
#[async_trait]
pub trait ServiceApi: Send + Sync {
    /// Exchange a management key for the project's service-role key.
    async fn resolve_service_role_key(
        &self,
        project_ref: &str,
        management_key: &SecretKey,
    ) -> Result<SecretKey>;

    /// List auth user identifiers in service order.
    async fn list_users(&self, project_ref: &str, role_key: &SecretKey) -> Result<Vec<String>>;

    /// Count the MFA factors enrolled by one user.
    async fn list_mfa_factors(
        &self,
        project_ref: &str,
        role_key: &SecretKey,
        user_id: &str,
    ) -> Result<usize>;

    /// Fetch the project's backup configuration.
    async fn get_backup_config(&self, project_ref: &str, key: &SecretKey) -> Result<BackupConfig>;

    /// Execute a SQL statement against the project database.
    async fn run_sql(
        &self,
        project_ref: &str,
        key: &SecretKey,
        statement: &str,
    ) -> Result<Vec<serde_json::Value>>;
}

#[async_trait]
impl ServiceApi for SupabaseClient {
    async fn resolve_service_role_key(
        &self,
        project_ref: &str,
        management_key: &SecretKey,
    ) -> Result<SecretKey> {
        self.management()
            .service_role_key(project_ref, management_key)
            .await
    }

    async fn list_users(&self, project_ref: &str, role_key: &SecretKey) -> Result<Vec<String>> {
        let users = self.auth_admin().list_users(project_ref, role_key).await?;
        Ok(users.into_iter().map(|u| u.id).collect())
    }

    async fn list_mfa_factors(
        &self,
        project_ref: &str,
        role_key: &SecretKey,
        user_id: &str,
    ) -> Result<usize> {
        let factors = self
            .auth_admin()
            .list_factors(project_ref, role_key, user_id)
            .await?;
        Ok(factors.len())
    }

    async fn get_backup_config(&self, project_ref: &str, key: &SecretKey) -> Result<BackupConfig> {
        self.management().backup_config(project_ref, key).await
    }

    async fn run_sql(
        &self,
        project_ref: &str,
        key: &SecretKey,
        statement: &str,
    ) -> Result<Vec<serde_json::Value>> {
        self.management().run_sql(project_ref, key, statement).await
    }
}

/// Authenticated view of one project for the duration of an audit pass.
///
/// Auth-admin calls use the role key; management-plane calls (backups, SQL)
/// use the management access key.
#[derive(Clone)]
pub struct ProjectSession {
    project_ref: String,
    access_key: SecretKey,
    role_key: SecretKey,
    api: Arc<dyn ServiceApi>,
}

impl fmt::Debug for ProjectSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectSession")
            .field("project_ref", &self.project_ref)
            .field("access_key", &self.access_key)
            .field("role_key", &self.role_key)
            .finish_non_exhaustive()
    }
}

impl ProjectSession {
    /// Bind a project reference and its keys to an API implementation.
    pub fn new(
        project_ref: impl Into<String>,
        access_key: SecretKey,
        role_key: SecretKey,
        api: Arc<dyn ServiceApi>,
    ) -> Self {
        Self {
            project_ref: project_ref.into(),
            access_key,
            role_key,
            api,
        }
    }

    pub fn project_ref(&self) -> &str {
        &self.project_ref
    }

    pub const fn access_key(&self) -> &SecretKey {
        &self.access_key
    }

    pub const fn role_key(&self) -> &SecretKey {
        &self.role_key
    }

    pub async fn list_users(&self) -> Result<Vec<String>> {
        self.api.list_users(&self.project_ref, &self.role_key).await
    }

    pub async fn list_mfa_factors(&self, user_id: &str) -> Result<usize> {
        self.api
            .list_mfa_factors(&self.project_ref, &self.role_key, user_id)
            .await
    }

    pub async fn backup_config(&self) -> Result<BackupConfig> {
        self.api
            .get_backup_config(&self.project_ref, &self.access_key)
            .await
    }

    pub async fn run_sql(&self, statement: &str) -> Result<Vec<serde_json::Value>> {
        self.api
            .run_sql(&self.project_ref, &self.access_key, statement)
            .await
    }
}
