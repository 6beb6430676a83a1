//! OIDC (OpenID Connect) module
//!
//! Handles logout token validation including discovery, JWKS fetching, and claim verification.

mod discovery;
mod jwks;
mod validate;

pub use discovery::{discovery_url, resolve_jwks_uri};
pub use jwks::fetch_keys;
pub use validate::{LogoutClaims, LogoutTokenValidator, BACKCHANNEL_LOGOUT_EVENT};
