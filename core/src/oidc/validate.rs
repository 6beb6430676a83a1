//! Logout Token validation
//!
//! Verifies a Back-Channel Logout Token against the provider's key set and
//! runs the mandatory claim checks. Checks run in a fixed order and the first
//! failure is the one reported.

use std::collections::BTreeSet;
use std::str::FromStr;

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{LogoutError, Result};
use crate::platform::Clock;

/// Event type every logout token must declare in its `events` claim
pub const BACKCHANNEL_LOGOUT_EVENT: &str = "http://schemas.openid.net/event/backchannel-logout";

/// Header fields read before the signature is checked
#[derive(Debug, Deserialize)]
struct UnverifiedHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

/// Verified logout token payload
#[derive(Debug, Clone, PartialEq)]
pub struct LogoutClaims {
    claims: Map<String, Value>,
}

impl LogoutClaims {
    /// Raw claim value, including explicit nulls
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Subject identifier
    pub fn sub(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// Session identifier
    pub fn sid(&self) -> Option<&str> {
        self.claims.get("sid").and_then(Value::as_str)
    }

    /// Consume the payload, keeping only `sub` and `sid`
    pub fn into_subject_and_session(mut self) -> (Option<String>, Option<String>) {
        let sub = take_string(&mut self.claims, "sub");
        let sid = take_string(&mut self.claims, "sid");
        (sub, sid)
    }
}

fn take_string(claims: &mut Map<String, Value>, name: &str) -> Option<String> {
    match claims.remove(name) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

/// Validates logout tokens for one issuer/audience pair
#[derive(Debug, Clone)]
pub struct LogoutTokenValidator {
    expected_issuer: String,
    expected_audience: String,
}

impl LogoutTokenValidator {
    pub fn new(expected_issuer: impl Into<String>, expected_audience: impl Into<String>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            expected_audience: expected_audience.into(),
        }
    }

    /// Verify `token` with `keys` and check every required claim
    pub fn validate(&self, token: &str, keys: &JwkSet, clock: &dyn Clock) -> Result<LogoutClaims> {
        let header = decode_unverified_header(token)?;

        // Must reject before any key is touched
        let alg = check_algorithm(&header.alg)?;

        let claims = verify_signature(token, alg, header.kid.as_deref(), keys)?;

        check_issuer(&claims, &self.expected_issuer)?;
        check_audience(&claims, &self.expected_audience)?;
        check_timestamps(&claims, clock.now_secs())?;
        check_events(&claims)?;
        check_subject_or_session(&claims)?;
        check_no_nonce(&claims)?;

        Ok(LogoutClaims { claims })
    }
}

/// Decode the header segment without verifying the signature
fn decode_unverified_header(token: &str) -> Result<UnverifiedHeader> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(LogoutError::malformed_token("invalid JWT format"));
    }

    let header = base64_url_decode(parts[0])?;
    serde_json::from_slice(&header)
        .map_err(|e| LogoutError::malformed_token(format!("invalid JWT header: {}", e)))
}

/// Base64 URL decode
fn base64_url_decode(input: &str) -> Result<Vec<u8>> {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    URL_SAFE_NO_PAD
        .decode(input)
        .or_else(|_| {
            use base64::engine::general_purpose::URL_SAFE;
            URL_SAFE.decode(input)
        })
        .map_err(|e| LogoutError::malformed_token(format!("invalid base64: {}", e)))
}

fn check_algorithm(alg: &str) -> Result<Algorithm> {
    let invalid = || LogoutError::InvalidAlgorithm {
        alg: alg.to_string(),
    };

    if alg.eq_ignore_ascii_case("none") {
        return Err(invalid());
    }

    Algorithm::from_str(alg).map_err(|_| invalid())
}

/// Pick the signing key named by `kid`, or the only key when there is no `kid`
fn select_key<'a>(keys: &'a JwkSet, kid: Option<&str>) -> Result<&'a Jwk> {
    let found = match kid {
        Some(kid) => keys.find(kid),
        None if keys.keys.len() == 1 => keys.keys.first(),
        None => None,
    };

    found.ok_or_else(|| LogoutError::KeyNotFound {
        kid: kid.map(str::to_string),
    })
}

fn verify_signature(
    token: &str,
    alg: Algorithm,
    kid: Option<&str>,
    keys: &JwkSet,
) -> Result<Map<String, Value>> {
    let jwk = select_key(keys, kid)?;

    let decoding_key = DecodingKey::from_jwk(jwk)
        .map_err(|e| LogoutError::signature_invalid(format!("invalid JWK: {}", e)))?;

    // Claim checks below own exp/aud/iss so their errors stay specific
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims::<&str>(&[]);

    let token_data = decode::<Map<String, Value>>(token, &decoding_key, &validation)
        .map_err(|e| LogoutError::signature_invalid(e.to_string()))?;

    Ok(token_data.claims)
}

/// A claim counts as present when it exists and is not null
fn claim_present(claims: &Map<String, Value>, name: &str) -> bool {
    claims.get(name).is_some_and(|v| !v.is_null())
}

fn claim_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs as i64))
}

fn render_claim(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_issuer(claims: &Map<String, Value>, expected: &str) -> Result<()> {
    match claims.get("iss") {
        Some(Value::String(iss)) if iss == expected => Ok(()),
        other => Err(LogoutError::InvalidIssuer {
            expected: expected.to_string(),
            actual: other.filter(|v| !v.is_null()).map(render_claim),
        }),
    }
}

/// A scalar audience becomes a one-element set; absent becomes empty
fn normalize_audience(aud: Option<&Value>) -> BTreeSet<String> {
    match aud {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(Value::Array(values)) => values.iter().map(render_claim).collect(),
        Some(value) => BTreeSet::from([render_claim(value)]),
    }
}

fn check_audience(claims: &Map<String, Value>, expected: &str) -> Result<()> {
    let aud = claims.get("aud");
    let accepted = match aud {
        Some(Value::String(value)) => value == expected,
        Some(Value::Array(values)) => values.iter().any(|v| v.as_str() == Some(expected)),
        _ => false,
    };

    if accepted {
        return Ok(());
    }

    Err(LogoutError::InvalidAudience {
        expected: expected.to_string(),
        actual: normalize_audience(aud),
    })
}

/// `iat` only needs to be present; `exp` must not be in the past
fn check_timestamps(claims: &Map<String, Value>, now_secs: u64) -> Result<()> {
    if !claim_present(claims, "iat") {
        return Err(LogoutError::MissingRequiredClaim { claim: "iat" });
    }

    let exp = claims
        .get("exp")
        .and_then(claim_as_i64)
        .ok_or(LogoutError::MissingRequiredClaim { claim: "exp" })?;

    let now = i64::try_from(now_secs).unwrap_or(i64::MAX);
    if now > exp {
        return Err(LogoutError::TokenExpired { exp });
    }

    Ok(())
}

fn check_events(claims: &Map<String, Value>) -> Result<()> {
    match claims.get("events") {
        None | Some(Value::Null) => Err(LogoutError::MissingRequiredClaim { claim: "events" }),
        Some(Value::Object(events)) if events.contains_key(BACKCHANNEL_LOGOUT_EVENT) => Ok(()),
        Some(_) => Err(LogoutError::InvalidEvents),
    }
}

/// Only string identifiers count; anything else could not be dispatched
fn check_subject_or_session(claims: &Map<String, Value>) -> Result<()> {
    let is_string = |name: &str| claims.get(name).is_some_and(Value::is_string);
    if is_string("sub") || is_string("sid") {
        Ok(())
    } else {
        Err(LogoutError::MissingSubOrSid)
    }
}

/// Any `nonce` is rejected, whatever its value
fn check_no_nonce(claims: &Map<String, Value>) -> Result<()> {
    if claims.contains_key("nonce") {
        Err(LogoutError::InvalidNonce)
    } else {
        Ok(())
    }
}
