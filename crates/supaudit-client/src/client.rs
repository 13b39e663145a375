//! Main Supabase API client implementation.

use crate::api::{AuthAdminApi, ManagementApi};
use crate::config::Endpoints;
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use supaudit_core::{AuditError, Result, SecretKey};
use tracing::{debug, warn};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a request authenticates
#[derive(Clone, Copy)]
pub(crate) enum Auth<'k> {
    /// Management access token as bearer
    Bearer(&'k SecretKey),
    /// Project role key as both `apikey` and bearer
    RoleKey(&'k SecretKey),
}

/// Client for the management API and the project auth admin API
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    endpoints: Endpoints,
}

impl SupabaseClient {
    /// Create a client against the hosted platform using default settings
    pub fn new() -> Result<Self> {
        SupabaseClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> SupabaseClientBuilder {
        SupabaseClientBuilder::new()
    }

    /// Access management API endpoints
    #[must_use]
    pub fn management(&self) -> ManagementApi<'_> {
        ManagementApi::new(self)
    }

    /// Access auth admin endpoints
    #[must_use]
    pub fn auth_admin(&self) -> AuthAdminApi<'_> {
        AuthAdminApi::new(self)
    }

    /// Configured endpoints
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &str, auth: Auth<'_>) -> Result<T> {
        self.get_with_query(url, &[], auth).await
    }

    /// Perform a GET request with query parameters
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        auth: Auth<'_>,
    ) -> Result<T> {
        debug!(url = %url, "GET request");

        let request = self.inner.http.get(url).query(params);
        self.send(request, auth).await
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
        auth: Auth<'_>,
    ) -> Result<T> {
        debug!(url = %url, "POST request");

        let request = self.inner.http.post(url).json(body);
        self.send(request, auth).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, auth: Auth<'_>) -> Result<T> {
        let request = match auth {
            Auth::Bearer(key) => request.bearer_auth(key.expose()),
            Auth::RoleKey(key) => request
                .header("apikey", key.expose())
                .bearer_auth(key.expose()),
        };

        let response = request
            .send()
            .await
            .map_err(|e| AuditError::transport(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle an API response that returns JSON
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuditError::transport(e.to_string()))?;

        if status.is_success() {
            // The query endpoint answers DDL with an empty body
            let body = if body.trim().is_empty() { "null" } else { body.as_str() };
            serde_json::from_str(body)
                .map_err(|e| AuditError::Query(format!("undecodable response: {e}")))
        } else {
            Err(Self::handle_error(status.as_u16(), body))
        }
    }

    /// Convert an error response to an `AuditError`
    fn handle_error(status: u16, body: String) -> AuditError {
        // Try to parse error message from JSON
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                ["message", "msg", "error"]
                    .iter()
                    .find_map(|field| v.get(*field).and_then(|e| e.as_str()).map(String::from))
            })
            .unwrap_or(body);

        if matches!(status, 401 | 403) {
            warn!(status, "upstream rejected credentials");
        }

        AuditError::service(status, message)
    }
}

/// Builder for configuring a [`SupabaseClient`]
pub struct SupabaseClientBuilder {
    endpoints: Endpoints,
    timeout: Duration,
    user_agent: String,
}

impl Default for SupabaseClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SupabaseClientBuilder {
    /// Create a new builder with hosted-platform endpoints
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("supaudit/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Replace all endpoints
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the management API base URL (useful for testing)
    #[must_use]
    pub fn management_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints = self.endpoints.management_url(url);
        self
    }

    /// Set the project URL template (useful for testing)
    #[must_use]
    pub fn project_url(mut self, template: impl Into<String>) -> Self {
        self.endpoints = self.endpoints.project_url(template);
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SupabaseClient> {
        self.endpoints.validate()?;

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| AuditError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(SupabaseClient {
            inner: Arc::new(ClientInner {
                http,
                endpoints: self.endpoints,
            }),
        })
    }
}
