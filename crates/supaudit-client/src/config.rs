//! Client endpoint configuration.

use url::Url;

use supaudit_core::{AuditError, Result};

/// Default management API base URL
pub const DEFAULT_MANAGEMENT_URL: &str = "https://api.supabase.com";

/// Default project API URL template; `{ref}` is replaced by the project reference
pub const DEFAULT_PROJECT_URL: &str = "https://{ref}.supabase.co";

/// Placeholder substituted in [`Endpoints::project_url`]
pub const PROJECT_REF_PLACEHOLDER: &str = "{ref}";

/// Users requested per page from the auth admin API
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Where the client sends its requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Management API base URL
    pub management_url: String,

    /// Project API URL template
    pub project_url: String,

    /// Page size for user listing
    pub page_size: u32,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new()
    }
}

impl Endpoints {
    /// Endpoints of the hosted platform
    #[must_use]
    pub fn new() -> Self {
        Self {
            management_url: DEFAULT_MANAGEMENT_URL.to_string(),
            project_url: DEFAULT_PROJECT_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the management API base URL
    #[must_use]
    pub fn management_url(mut self, url: impl Into<String>) -> Self {
        self.management_url = url.into();
        self
    }

    /// Set the project URL template (may omit `{ref}` to pin one host)
    #[must_use]
    pub fn project_url(mut self, template: impl Into<String>) -> Self {
        self.project_url = template.into();
        self
    }

    /// Set the user listing page size
    #[must_use]
    pub const fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Check that both base URLs parse
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.management_url)
            .map_err(|e| AuditError::Config(format!("management url: {e}")))?;
        Url::parse(&self.render_project_url("ref"))
            .map_err(|e| AuditError::Config(format!("project url: {e}")))?;
        if self.page_size == 0 {
            return Err(AuditError::Config("page size must be positive".into()));
        }
        Ok(())
    }

    /// Full management API URL for a path
    #[must_use]
    pub fn management(&self, path: &str) -> String {
        format!("{}{path}", self.management_url.trim_end_matches('/'))
    }

    /// Full project API URL for a path
    #[must_use]
    pub fn project(&self, project_ref: &str, path: &str) -> String {
        format!(
            "{}{path}",
            self.render_project_url(project_ref).trim_end_matches('/')
        )
    }

    fn render_project_url(&self, project_ref: &str) -> String {
        self.project_url
            .replace(PROJECT_REF_PLACEHOLDER, project_ref)
    }
}
