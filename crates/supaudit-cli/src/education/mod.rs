//! Educational mode: what each command does before it runs.

use colored::Colorize;

/// Command explanation builder.
pub struct Explain {
    description: String,
    api_calls: Vec<String>,
    side_effects: Option<String>,
    what_happens: Vec<String>,
    learn_more: Option<String>,
}

impl Explain {
    fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            api_calls: Vec::new(),
            side_effects: None,
            what_happens: Vec::new(),
            learn_more: None,
        }
    }

    fn api(mut self, endpoint: &str) -> Self {
        self.api_calls.push(endpoint.to_string());
        self
    }

    fn writes(mut self, effect: &str) -> Self {
        self.side_effects = Some(effect.to_string());
        self
    }

    fn step(mut self, step: &str) -> Self {
        self.what_happens.push(step.to_string());
        self
    }

    fn docs(mut self, url: &str) -> Self {
        self.learn_more = Some(url.to_string());
        self
    }

    /// Print the explanation to stderr, keeping stdout for results.
    pub fn print(&self) {
        eprintln!();
        eprintln!("{}", "=== What This Does ===".bold().cyan());
        eprintln!("{}", self.description);
        eprintln!();

        if !self.what_happens.is_empty() {
            eprintln!("{}", "How it works:".bold());
            for (i, step) in self.what_happens.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, step);
            }
            eprintln!();
        }

        if !self.api_calls.is_empty() {
            eprintln!("{}", "API calls:".bold());
            for call in &self.api_calls {
                eprintln!("  {}", call.dimmed());
            }
        }

        if let Some(effect) = &self.side_effects {
            eprintln!("{} {}", "Writes:".bold(), effect);
        }

        if let Some(url) = &self.learn_more {
            eprintln!();
            eprintln!("{} {}", "Learn more:".bold(), url.cyan().underline());
        }

        eprintln!();
        eprintln!("{}", "=== Results ===".bold().cyan());
        eprintln!();
    }

    pub fn audit(project_ref: &str, remediate: bool) -> Self {
        let explanation = Self::new(&format!(
            "Audits the security posture of project {project_ref}: MFA coverage, \
             point-in-time recovery and row-level security."
        ))
        .api(&format!("GET  /v1/projects/{project_ref}/api-keys"))
        .api("GET  /auth/v1/admin/users")
        .api("GET  /auth/v1/admin/users/{id}/factors")
        .api(&format!("GET  /v1/projects/{project_ref}/database/backups"))
        .api(&format!("POST /v1/projects/{project_ref}/database/query"))
        .step("Uses the stored access key, or encrypts and stores the one you pass")
        .step("Exchanges the access key for the project's service-role key")
        .step("Lists auth users and reports those without an MFA factor")
        .step("Reads the backup configuration to see whether PITR is enabled")
        .step("Lists public tables that do not have row-level security");

        let explanation = if remediate {
            explanation
                .step("Runs ALTER TABLE ... ENABLE ROW LEVEL SECURITY on each of them")
                .writes("one audit-trail entry per check; DDL on tables without RLS")
        } else {
            explanation.writes("one audit-trail entry per check (pass --remediate to fix RLS)")
        };

        explanation.docs("https://supabase.com/docs/guides/platform/going-into-prod#security")
    }

    pub fn logs(project_ref: &str) -> Self {
        Self::new(&format!(
            "Lists the audit trail recorded for project {project_ref}, newest first."
        ))
        .step("Looks up the project in the local store")
        .step("Reads the entries written by previous audit passes")
        .step("Makes no network calls")
    }
}
