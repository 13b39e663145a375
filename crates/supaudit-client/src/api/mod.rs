//! API endpoint modules.

mod auth_admin;
mod management;

pub use auth_admin::AuthAdminApi;
pub use management::{ManagementApi, SqlQuery};
