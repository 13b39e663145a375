//! Management API endpoints (project keys, backups, SQL).

use crate::client::Auth;
use crate::SupabaseClient;
use serde::Serialize;
use supaudit_core::{ApiKeyEntry, AuditError, BackupConfig, Result, SecretKey};

/// Body of the SQL query endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SqlQuery<'a> {
    /// Statement to execute
    pub query: &'a str,
}

/// Management API endpoints
pub struct ManagementApi<'a> {
    client: &'a SupabaseClient,
}

impl<'a> ManagementApi<'a> {
    pub(crate) fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// List the project's API keys
    pub async fn api_keys(
        &self,
        project_ref: &str,
        access_key: &SecretKey,
    ) -> Result<Vec<ApiKeyEntry>> {
        let url = self
            .client
            .endpoints()
            .management(&format!("/v1/projects/{project_ref}/api-keys"));
        self.client.get(&url, Auth::Bearer(access_key)).await
    }

    /// Exchange a management access key for the project's service-role key
    pub async fn service_role_key(
        &self,
        project_ref: &str,
        access_key: &SecretKey,
    ) -> Result<SecretKey> {
        self.api_keys(project_ref, access_key)
            .await?
            .into_iter()
            .find(ApiKeyEntry::is_service_role)
            .map(|entry| SecretKey::new(entry.api_key))
            .ok_or_else(|| {
                AuditError::Query(format!(
                    "project {project_ref} has no service_role key in its key listing"
                ))
            })
    }

    /// Fetch the project's backup configuration
    pub async fn backup_config(
        &self,
        project_ref: &str,
        access_key: &SecretKey,
    ) -> Result<BackupConfig> {
        let url = self
            .client
            .endpoints()
            .management(&format!("/v1/projects/{project_ref}/database/backups"));
        self.client.get(&url, Auth::Bearer(access_key)).await
    }

    /// Execute a SQL statement against the project database
    ///
    /// Statements that return nothing (DDL) yield an empty row set.
    pub async fn run_sql(
        &self,
        project_ref: &str,
        access_key: &SecretKey,
        statement: &str,
    ) -> Result<Vec<serde_json::Value>> {
        let url = self
            .client
            .endpoints()
            .management(&format!("/v1/projects/{project_ref}/database/query"));
        let rows: Option<Vec<serde_json::Value>> = self
            .client
            .post(&url, &SqlQuery { query: statement }, Auth::Bearer(access_key))
            .await?;
        Ok(rows.unwrap_or_default())
    }
}
