use serde::{Deserialize, Serialize};

use super::{CheckResult, MfaResult, PitrResult, RlsResult};

/// Composite result of one audit pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// MFA coverage result
    pub mfa_data: MfaResult,

    /// Point-in-time recovery result
    pub pitr_data: PitrResult,

    /// Row-level security result
    pub rls_data: RlsResult,
}

impl AuditReport {
    /// Returns true if no check found a deficiency
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mfa_data.is_clean() && self.pitr_data.is_clean() && self.rls_data.is_clean()
    }

    /// Number of individual deficiencies across all checks
    #[must_use]
    pub fn deficiency_count(&self) -> usize {
        self.mfa_data.unprotected_users.len()
            + usize::from(!self.pitr_data.enabled)
            + self.rls_data.violations.len()
    }

    /// The three results as tagged check results
    #[must_use]
    pub fn checks(&self) -> [CheckResult; 3] {
        [
            CheckResult::Mfa(self.mfa_data.clone()),
            CheckResult::Pitr(self.pitr_data.clone()),
            CheckResult::Rls(self.rls_data.clone()),
        ]
    }
}
