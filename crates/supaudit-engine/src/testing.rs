//! In-process fake of the remote service for unit tests.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use supaudit_core::{AuditError, BackupConfig, ProjectCredential, Result, SecretKey};
use uuid::Uuid;

use crate::audit_log::AuditLogger;
use crate::checks::RLS_INTROSPECTION_SQL;
use crate::crypto::CryptoBox;
use crate::repository::{MemoryRepository, Repository};
use crate::service::{ProjectSession, ServiceApi};

pub fn test_crypto() -> CryptoBox {
    CryptoBox::with_iterations("test-passphrase", NonZeroU32::new(1_000).unwrap()).unwrap()
}

pub fn session(api: Arc<FakeApi>) -> ProjectSession {
    ProjectSession::new(
        "abc123",
        SecretKey::new("sk_test"),
        SecretKey::new("role-key"),
        api,
    )
}

/// Repository holding one credential, a logger over it, and the credential id.
pub async fn seeded_logger() -> (Arc<MemoryRepository>, AuditLogger, Uuid) {
    let repo = Arc::new(MemoryRepository::new());
    let credential = repo
        .create_credential(ProjectCredential::new("abc123", "a:b:c"))
        .await
        .unwrap();
    let logger = AuditLogger::new(repo.clone());
    (repo, logger, credential.id)
}

#[derive(Default)]
pub struct FakeApi {
    /// `(user id, factor count)` in listing order
    pub users: Vec<(String, usize)>,
    pub pitr_enabled: bool,
    /// `(table name, rls flag)` in introspection order
    pub tables: Vec<(String, bool)>,
    pub role_key_status: Option<u16>,
    pub backup_status: Option<u16>,
    pub remediation_status: Option<u16>,
    pub introspection_rows: Option<Vec<serde_json::Value>>,
    pub role_key_requests: Mutex<Vec<String>>,
    pub statements: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_users(users: &[(&str, usize)]) -> Self {
        Self {
            users: users.iter().map(|(id, n)| ((*id).to_string(), *n)).collect(),
            ..Self::default()
        }
    }

    pub fn with_tables(tables: &[(&str, bool)]) -> Self {
        Self {
            tables: tables
                .iter()
                .map(|(name, rls)| ((*name).to_string(), *rls))
                .collect(),
            ..Self::default()
        }
    }

    pub fn role_key_requests(&self) -> Vec<String> {
        self.role_key_requests.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn remediation_statements(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|s| s.starts_with("alter table"))
            .collect()
    }
}

#[async_trait]
impl ServiceApi for FakeApi {
    async fn resolve_service_role_key(
        &self,
        _project_ref: &str,
        management_key: &SecretKey,
    ) -> Result<SecretKey> {
        self.role_key_requests
            .lock()
            .unwrap()
            .push(management_key.expose().to_string());
        match self.role_key_status {
            Some(status) => Err(AuditError::service(status, "rejected")),
            None => Ok(SecretKey::new("role-key")),
        }
    }

    async fn list_users(&self, _project_ref: &str, _role_key: &SecretKey) -> Result<Vec<String>> {
        Ok(self.users.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn list_mfa_factors(
        &self,
        _project_ref: &str,
        _role_key: &SecretKey,
        user_id: &str,
    ) -> Result<usize> {
        self.users
            .iter()
            .find(|(id, _)| id == user_id)
            .map(|(_, n)| *n)
            .ok_or_else(|| AuditError::service(404, format!("user {user_id} not found")))
    }

    async fn get_backup_config(&self, _project_ref: &str, _key: &SecretKey) -> Result<BackupConfig> {
        match self.backup_status {
            Some(status) => Err(AuditError::service(status, "backup lookup failed")),
            None => Ok(BackupConfig {
                pitr_enabled: self.pitr_enabled,
            }),
        }
    }

    async fn run_sql(
        &self,
        _project_ref: &str,
        _key: &SecretKey,
        statement: &str,
    ) -> Result<Vec<serde_json::Value>> {
        self.statements.lock().unwrap().push(statement.to_string());

        if statement == RLS_INTROSPECTION_SQL {
            if let Some(rows) = &self.introspection_rows {
                return Ok(rows.clone());
            }
            return Ok(self
                .tables
                .iter()
                .map(|(name, rls)| {
                    json!({ "relname": name, "relrowsecurity": rls, "relforcerowsecurity": false })
                })
                .collect());
        }

        match self.remediation_status {
            Some(status) => Err(AuditError::service(status, "statement failed")),
            None => Ok(Vec::new()),
        }
    }
}
