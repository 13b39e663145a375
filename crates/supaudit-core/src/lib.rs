//! Core types for the supaudit project auditor.
//!
//! This crate provides the foundational types shared by the client, the
//! check engine, and the command-line front end:
//!
//! - **Types**: credentials, audit-trail entries, per-check results, and the
//!   composite [`AuditReport`] with its wire shape
//! - **Errors**: the [`AuditError`] taxonomy and its HTTP status mapping
//!
//! # Example
//!
//! ```rust,ignore
//! use supaudit_core::{AuditReport, AuditError, Result};
//!
//! fn summarize(report: &AuditReport) -> Result<()> {
//!     println!("unprotected users: {}", report.mfa_data.unprotected_users.len());
//!     println!("pitr enabled: {}", report.pitr_data.enabled);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/supaudit-core/0.3.0")]

mod error;
pub mod types;

pub use error::{AuditError, ErrorBody, Result};
pub use types::*;
