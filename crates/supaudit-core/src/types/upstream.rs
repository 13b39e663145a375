use serde::{Deserialize, Serialize};

/// Name of the project-scoped key that bypasses row-level security
pub const SERVICE_ROLE_KEY_NAME: &str = "service_role";

/// One entry from the management API's project key listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    /// Key role name (`anon`, `service_role`, ...)
    pub name: String,

    /// Key value
    pub api_key: String,
}

impl ApiKeyEntry {
    /// Returns true if this is the service-role key
    #[must_use]
    pub fn is_service_role(&self) -> bool {
        self.name == SERVICE_ROLE_KEY_NAME
    }
}

/// Backup settings of a project
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Whether point-in-time recovery is enabled
    #[serde(default)]
    pub pitr_enabled: bool,
}

/// An auth user as listed by the admin API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// User identifier
    pub id: String,

    /// Email, if any
    #[serde(default)]
    pub email: Option<String>,
}

/// One page of the admin user listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersPage {
    /// Users on this page
    #[serde(default)]
    pub users: Vec<AuthUser>,
}

/// An enrolled MFA factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaFactor {
    /// Factor identifier
    pub id: String,

    /// Factor kind, e.g. `totp`
    #[serde(default)]
    pub factor_type: Option<String>,

    /// `verified` or `unverified`
    #[serde(default)]
    pub status: Option<String>,
}
