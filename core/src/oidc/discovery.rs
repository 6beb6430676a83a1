//! OIDC Discovery document fetching
//!
//! Resolves the provider's JWKS location from its discovery document.

use serde::Deserialize;

use crate::error::{LogoutError, Result};
use crate::platform::HttpClient;

/// OIDC Discovery document (partial)
#[derive(Deserialize)]
struct DiscoveryDocument {
    #[serde(default)]
    jwks_uri: Option<String>,
}

/// Build the discovery URL for an issuer
pub fn discovery_url(issuer: &str) -> String {
    format!("{}/.well-known/openid-configuration", issuer.trim_end_matches('/'))
}

/// Fetch the issuer's discovery document and return its `jwks_uri`
pub async fn resolve_jwks_uri(issuer: &str, http: &dyn HttpClient) -> Result<String> {
    let url = discovery_url(issuer);
    tracing::debug!(url = %url, "fetching discovery document");

    let response = http
        .get(
            &url,
            &[
                ("Accept", "application/json"),
                ("User-Agent", "backchannel-logout-rust"),
            ],
        )
        .await
        .map_err(|e| LogoutError::discovery_fetch_failed(e.to_string()))?;

    if response.status != 200 {
        return Err(LogoutError::discovery_fetch_failed(format!(
            "HTTP {}",
            response.status
        )));
    }

    let doc: DiscoveryDocument = response
        .json()
        .map_err(|e| LogoutError::discovery_parse_failed(e.to_string()))?;

    match doc.jwks_uri {
        Some(uri) if !uri.is_empty() => Ok(uri),
        _ => Err(LogoutError::JwksUriMissing),
    }
}
