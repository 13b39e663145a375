//! supaudit - Supabase security posture auditor
//!
//! Checks MFA coverage, point-in-time recovery and row-level security.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    supaudit_cli::run().await
}
