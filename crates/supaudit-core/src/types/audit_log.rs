use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One append-only audit-trail row describing the outcome of a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Entry identifier
    pub id: Uuid,

    /// Check name, e.g. `User MFA Check`
    pub event: String,

    /// Number of audited items that passed
    pub success_count: u32,

    /// Number of audited items that failed
    pub failure_count: u32,

    /// Remediation guidance for the failures
    pub suggested_help: String,

    /// Optional outcome message
    #[serde(default)]
    pub message: Option<String>,

    /// Short run marker, e.g. `MFA Checks Run`
    pub log_message: String,

    /// Credential record this entry belongs to
    pub project_id: Uuid,

    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Start a new entry for the given project and event
    pub fn new(project_id: Uuid, event: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: event.into(),
            success_count: 0,
            failure_count: 0,
            suggested_help: String::new(),
            message: None,
            log_message: String::new(),
            project_id,
            created_at: Utc::now(),
        }
    }

    /// Set success and failure counts
    #[must_use]
    pub const fn counts(mut self, success: u32, failure: u32) -> Self {
        self.success_count = success;
        self.failure_count = failure;
        self
    }

    /// Set the remediation guidance
    #[must_use]
    pub fn suggested_help(mut self, help: impl Into<String>) -> Self {
        self.suggested_help = help.into();
        self
    }

    /// Set the outcome message
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the run marker
    #[must_use]
    pub fn log_message(mut self, log_message: impl Into<String>) -> Self {
        self.log_message = log_message.into();
        self
    }

    /// Total number of audited items
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.success_count + self.failure_count
    }

    /// Returns true if any audited item failed
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failure_count > 0
    }
}
