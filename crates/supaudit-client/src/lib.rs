//! HTTP client for the Supabase management and auth admin APIs.
//!
//! This crate provides the [`SupabaseClient`] used by the audit engine to
//! resolve project keys, list users and their MFA factors, read backup
//! settings, and run SQL against a project database.

#![doc(html_root_url = "https://docs.rs/supaudit-client/0.3.0")]

mod client;
mod config;
pub mod api;

pub use client::{SupabaseClient, SupabaseClientBuilder};
pub use config::*;
pub use supaudit_core::{AuditError, Result};
