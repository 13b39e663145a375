mod audit_log;
mod check;
mod credential;
mod report;
mod secret;
mod upstream;

pub use audit_log::*;
pub use check::*;
pub use credential::*;
pub use report::*;
pub use secret::*;
pub use upstream::*;
