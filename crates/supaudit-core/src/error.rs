use serde::Serialize;
use thiserror::Error;

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that can occur during an audit pass
#[derive(Error, Debug)]
pub enum AuditError {
    /// No stored credential for the project and no access key supplied
    #[error(
        "no stored credential for this project: supply an access key with the project reference"
    )]
    MissingCredential,

    /// Stored credential token does not have the expected shape
    #[error("malformed credential token: {0}")]
    MalformedToken(String),

    /// Cipher rejected the stored credential (wrong passphrase or corruption)
    #[error("credential decryption failed")]
    DecryptionFailed,

    /// An outbound call returned a non-success status or failed in transport
    #[error("service call failed ({}): {body}", status_label(*status_code))]
    ServiceCall {
        /// Upstream HTTP status, absent on transport failure
        status_code: Option<u16>,
        /// Response body or transport error description
        body: String,
    },

    /// An upstream response did not have the expected shape
    #[error("unexpected query result: {0}")]
    Query(String),

    /// Credential or audit-trail storage failed
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Caller input was rejected before any work was done
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_label(status: Option<u16>) -> String {
    status.map_or_else(|| "transport".to_string(), |code| code.to_string())
}

impl AuditError {
    /// Build a service-call error from an upstream status and body
    pub fn service(status_code: u16, body: impl Into<String>) -> Self {
        Self::ServiceCall {
            status_code: Some(status_code),
            body: body.into(),
        }
    }

    /// Build a service-call error for a transport failure
    pub fn transport(body: impl Into<String>) -> Self {
        Self::ServiceCall {
            status_code: None,
            body: body.into(),
        }
    }

    /// Stable snake_case name of the error kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedToken(_) => "malformed_token",
            Self::DecryptionFailed => "decryption_failed",
            Self::ServiceCall { .. } => "service_call",
            Self::Query(_) => "query",
            Self::Persistence(_) => "persistence",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Returns true if the upstream rejected our credentials
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::ServiceCall {
                status_code: Some(401 | 403),
                ..
            }
        )
    }

    /// HTTP status an inbound boundary should answer with for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MissingCredential | Self::InvalidInput(_) => 400,
            Self::ServiceCall { .. } if self.is_auth_error() => 401,
            Self::ServiceCall { .. } => 502,
            _ => 500,
        }
    }

    /// Upstream status code, if this error came from an outbound call
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::ServiceCall { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Error payload returned across the inbound boundary
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Error kind, see [`AuditError::kind`]
    pub error: &'static str,
    /// Human readable description
    pub message: String,
    /// HTTP status the boundary answers with
    pub status: u16,
}

impl From<&AuditError> for ErrorBody {
    fn from(err: &AuditError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
            status: err.http_status(),
        }
    }
}
