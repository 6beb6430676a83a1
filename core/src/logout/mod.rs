//! Back-channel logout processing
//!
//! Pulls the logout token out of an inbound request, verifies it and hands the
//! subject/session identifiers to the host application.

mod executor;
mod request;

pub use executor::Executor;
pub use request::{LogoutRequest, LogoutRequestParams, LOGOUT_TOKEN_PARAM};
