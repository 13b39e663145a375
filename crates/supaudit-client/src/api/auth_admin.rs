//! Auth admin endpoints of a project (users and MFA factors).

use std::collections::HashSet;

use crate::client::Auth;
use crate::SupabaseClient;
use supaudit_core::{AuthUser, MfaFactor, Result, SecretKey, UsersPage};
use tracing::{debug, warn};

/// Auth admin endpoints, authenticated with the project's role key
pub struct AuthAdminApi<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AuthAdminApi<'a> {
    pub(crate) fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Fetch one page of users (1-indexed)
    pub async fn users_page(
        &self,
        project_ref: &str,
        role_key: &SecretKey,
        page: u32,
    ) -> Result<UsersPage> {
        let endpoints = self.client.endpoints();
        let url = endpoints.project(project_ref, "/auth/v1/admin/users");
        let params = [
            ("page", page.to_string()),
            ("per_page", endpoints.page_size.to_string()),
        ];
        self.client
            .get_with_query(&url, &params, Auth::RoleKey(role_key))
            .await
    }

    /// List every user, following pages until a short page.
    ///
    /// Stops early when a page brings no user not already seen, so a server
    /// that ignores `page` cannot keep the loop going.
    pub async fn list_users(
        &self,
        project_ref: &str,
        role_key: &SecretKey,
    ) -> Result<Vec<AuthUser>> {
        let page_size = self.client.endpoints().page_size as usize;
        let mut seen = HashSet::new();
        let mut users = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.users_page(project_ref, role_key, page).await?.users;
            let len = batch.len();
            let before = users.len();
            users.extend(batch.into_iter().filter(|user| seen.insert(user.id.clone())));
            debug!(page, len, new = users.len() - before, "fetched user page");

            if len < page_size {
                break;
            }
            if users.len() == before {
                warn!(page, "user listing repeated itself, stopping");
                break;
            }
            page += 1;
        }

        Ok(users)
    }

    /// List the MFA factors enrolled by a user
    pub async fn list_factors(
        &self,
        project_ref: &str,
        role_key: &SecretKey,
        user_id: &str,
    ) -> Result<Vec<MfaFactor>> {
        let url = self
            .client
            .endpoints()
            .project(project_ref, &format!("/auth/v1/admin/users/{user_id}/factors"));
        self.client.get(&url, Auth::RoleKey(role_key)).await
    }
}
