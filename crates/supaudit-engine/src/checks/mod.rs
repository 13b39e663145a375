//! The three posture checks.
//!
//! Each check consumes a [`ProjectSession`](crate::service::ProjectSession),
//! produces one result, and writes exactly one audit entry.

mod mfa;
mod pitr;
mod rls;

pub use mfa::{MfaChecker, MFA_DOC_LINK, MFA_EVENT, MFA_HINT};
pub use pitr::{pitr_dashboard_url, PitrChecker, PITR_EVENT, PITR_HINT};
pub use rls::{
    remediation_command, RemediationPolicy, RlsChecker, RlsEvaluation, TableRls, RLS_EVENT,
    RLS_INTROSPECTION_SQL,
};

/// Saturating conversion for audit counters.
fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
