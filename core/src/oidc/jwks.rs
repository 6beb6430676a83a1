//! JWKS (JSON Web Key Set) handling
//!
//! Fetched fresh on every call; nothing is cached between logouts.

use jsonwebtoken::jwk::{Jwk, JwkSet};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{LogoutError, Result};
use crate::platform::HttpClient;

/// JWKS document before individual keys are parsed
#[derive(Deserialize)]
struct RawKeySet {
    keys: Vec<Value>,
}

/// Fetch JWKS from a URI.
///
/// Keys `jsonwebtoken` cannot represent are skipped.
pub async fn fetch_keys(jwks_uri: &str, http: &dyn HttpClient) -> Result<JwkSet> {
    tracing::debug!(url = %jwks_uri, "fetching JWKS");

    let response = http
        .get(
            jwks_uri,
            &[
                ("Accept", "application/json"),
                ("User-Agent", "backchannel-logout-rust"),
            ],
        )
        .await
        .map_err(|e| LogoutError::key_set_fetch_failed(e.to_string()))?;

    if response.status != 200 {
        return Err(LogoutError::key_set_fetch_failed(format!(
            "HTTP {}",
            response.status
        )));
    }

    let raw: RawKeySet = response
        .json()
        .map_err(|e| LogoutError::key_set_parse_failed(e.to_string()))?;

    let keys = raw
        .keys
        .into_iter()
        .filter_map(|key| match serde_json::from_value::<Jwk>(key) {
            Ok(jwk) => Some(jwk),
            Err(e) => {
                tracing::debug!("skipping unsupported JWK: {}", e);
                None
            }
        })
        .collect();

    Ok(JwkSet { keys })
}
