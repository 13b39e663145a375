use serde::{Deserialize, Serialize};

/// A user that has no MFA factor enrolled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMfaStatus {
    /// Auth user identifier
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Always `false` for reported users
    #[serde(rename = "mfaStatus")]
    pub mfa_enabled: bool,
}

impl UserMfaStatus {
    /// Report a user without any MFA factor
    pub fn unprotected(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            mfa_enabled: false,
        }
    }
}

/// Outcome of the MFA coverage check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfaResult {
    /// Users without MFA, in the order the auth service listed them
    #[serde(rename = "mfaStatus")]
    pub unprotected_users: Vec<UserMfaStatus>,

    /// Remediation hint, present only when users are unprotected
    #[serde(rename = "resolution", default, skip_serializing_if = "Option::is_none")]
    pub resolution_hint: Option<String>,

    /// Documentation link, present only when users are unprotected
    #[serde(rename = "link", default, skip_serializing_if = "Option::is_none")]
    pub doc_link: Option<String>,
}

impl MfaResult {
    /// Returns true if every user has MFA enrolled
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unprotected_users.is_empty()
    }
}

/// Outcome of the point-in-time recovery check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitrResult {
    /// Whether PITR is enabled on the project
    #[serde(rename = "pitrStatus")]
    pub enabled: bool,

    /// Remediation hint, present only when PITR is disabled
    #[serde(rename = "resolution", default, skip_serializing_if = "Option::is_none")]
    pub resolution_hint: Option<String>,

    /// Dashboard link, present only when PITR is disabled
    #[serde(rename = "link", default, skip_serializing_if = "Option::is_none")]
    pub doc_link: Option<String>,
}

impl PitrResult {
    /// Returns true if PITR is enabled
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.enabled
    }
}

/// A public table with row-level security disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlsViolation {
    /// Table name in the `public` schema
    #[serde(rename = "tableName")]
    pub table_name: String,

    /// Always `false` for reported tables
    #[serde(rename = "rlsStatus")]
    pub rls_enabled: bool,

    /// What was (or should be) done about it
    #[serde(rename = "resolution")]
    pub resolution_hint: String,

    /// DDL statement that enables RLS on the table
    #[serde(rename = "command")]
    pub remediation_command: String,
}

/// Outcome of the row-level security check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlsResult {
    /// Tables with RLS disabled, in introspection order
    #[serde(rename = "rlsStatus")]
    pub violations: Vec<RlsViolation>,

    /// Whether the remediation statements were executed
    #[serde(skip)]
    pub remediated: bool,
}

impl RlsResult {
    /// Returns true if every public table has RLS enabled
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Result of any one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "lowercase")]
pub enum CheckResult {
    /// MFA coverage
    Mfa(MfaResult),
    /// Point-in-time recovery
    Pitr(PitrResult),
    /// Row-level security
    Rls(RlsResult),
}

impl CheckResult {
    /// Returns true if the check found a deficiency
    #[must_use]
    pub fn is_deficient(&self) -> bool {
        match self {
            Self::Mfa(r) => !r.is_clean(),
            Self::Pitr(r) => !r.is_clean(),
            Self::Rls(r) => !r.is_clean(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mfa_result_omits_hint_when_clean() {
        let result = MfaResult::default();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "mfaStatus": [] })
        );
    }

    #[test]
    fn mfa_result_wire_shape() {
        let result = MfaResult {
            unprotected_users: vec![UserMfaStatus::unprotected("u2")],
            resolution_hint: Some("enroll".into()),
            doc_link: Some("https://example.com".into()),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "mfaStatus": [{ "userId": "u2", "mfaStatus": false }],
                "resolution": "enroll",
                "link": "https://example.com"
            })
        );
    }

    #[test]
    fn rls_result_wire_shape_skips_remediated_flag() {
        let result = RlsResult {
            violations: vec![RlsViolation {
                table_name: "orders".into(),
                rls_enabled: false,
                resolution_hint: "hint".into(),
                remediation_command: "alter table orders enable row level security;".into(),
            }],
            remediated: true,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "rlsStatus": [{
                    "tableName": "orders",
                    "rlsStatus": false,
                    "resolution": "hint",
                    "command": "alter table orders enable row level security;"
                }]
            })
        );
    }

    #[test]
    fn check_result_deficiency() {
        assert!(!CheckResult::Pitr(PitrResult {
            enabled: true,
            ..PitrResult::default()
        })
        .is_deficient());
        assert!(CheckResult::Pitr(PitrResult::default()).is_deficient());
        assert!(!CheckResult::Rls(RlsResult::default()).is_deficient());
    }
}
