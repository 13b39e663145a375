use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored management credential for one project reference.
///
/// `encrypted_access_key` always holds a token produced by the engine's
/// crypto box, never the plaintext key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCredential {
    /// Record identifier, referenced by audit-log entries
    pub id: Uuid,

    /// External project reference (e.g. `abcdefghijklmnop`)
    pub project_ref: String,

    /// `salt:nonce:ciphertext` token
    pub encrypted_access_key: String,

    /// When the record was first stored
    pub created_at: DateTime<Utc>,
}

impl ProjectCredential {
    /// Create a new record with a fresh identifier
    pub fn new(project_ref: impl Into<String>, encrypted_access_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_ref: project_ref.into(),
            encrypted_access_key: encrypted_access_key.into(),
            created_at: Utc::now(),
        }
    }
}
