//! backchannel-logout-core: OpenID Connect Back-Channel Logout for relying parties
//!
//! Verifies Logout Tokens sent by an OpenID Provider and extracts the subject
//! and session identifiers the host application must log out. Depends only on
//! abstract platform traits (HttpClient, Clock, Environment); session storage
//! and HTTP routing stay with the host.

pub mod config;
pub mod error;
pub mod logout;
pub mod oidc;
pub mod platform;

pub use config::Config;
pub use error::{ErrorKind, ErrorResponse, LogoutError, Result};
pub use logout::{Executor, LogoutRequest, LogoutRequestParams};

#[cfg(test)]
pub mod test_support;
