//! Error types and HTTP response mapping

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for logout operations
pub type Result<T> = std::result::Result<T, LogoutError>;

/// Placeholder rendered when a claim is absent from the token
const ABSENT: &str = "<none>";

/// Error families a host can branch on without matching every variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised while building configuration, before any request is handled
    Configuration,
    /// Raised by the executor before any network or cryptographic work
    Request,
    /// Discovery, key resolution, signature and claim failures
    Decode,
}

/// Every way a back-channel logout can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogoutError {
    #[error("issuer must be set in the back-channel logout configuration")]
    IssuerNotConfigured,

    #[error("audience (client id) must be set in the back-channel logout configuration")]
    AudienceNotConfigured,

    #[error("missing logout_token parameter")]
    MissingLogoutToken,

    #[error("no handler provided for sub and sid")]
    NoHandlerProvided,

    #[error("failed to fetch discovery document: {message}")]
    DiscoveryFetchFailed { message: String },

    #[error("failed to parse OpenID Connect discovery document: {message}")]
    DiscoveryParseFailed { message: String },

    #[error("jwks_uri not found in discovery document")]
    JwksUriMissing,

    #[error("failed to fetch JWKS: {message}")]
    KeySetFetchFailed { message: String },

    #[error("invalid JWKS: {message}")]
    KeySetParseFailed { message: String },

    #[error("malformed logout token: {message}")]
    MalformedToken { message: String },

    #[error("invalid token algorithm: {alg}")]
    InvalidAlgorithm { alg: String },

    #[error("no signing key found for kid {}", .kid.as_deref().unwrap_or(ABSENT))]
    KeyNotFound { kid: Option<String> },

    #[error("signature verification failed: {message}")]
    SignatureInvalid { message: String },

    #[error(
        "invalid iss claim. expected: {expected}, but received: {}",
        .actual.as_deref().unwrap_or(ABSENT)
    )]
    InvalidIssuer {
        expected: String,
        actual: Option<String>,
    },

    #[error(
        "invalid aud claim. expected: {expected}, but received: {}",
        render_audience(.actual)
    )]
    InvalidAudience {
        expected: String,
        actual: BTreeSet<String>,
    },

    #[error("missing {claim} claim")]
    MissingRequiredClaim { claim: &'static str },

    #[error("events claim does not contain the back-channel logout event")]
    InvalidEvents,

    #[error("logout token must contain a sub or sid claim")]
    MissingSubOrSid,

    #[error("nonce claim is not allowed in a logout token")]
    InvalidNonce,

    #[error("logout token expired at {exp}")]
    TokenExpired { exp: i64 },
}

fn render_audience(actual: &BTreeSet<String>) -> String {
    if actual.is_empty() {
        return ABSENT.to_string();
    }
    let values: Vec<&str> = actual.iter().map(String::as_str).collect();
    format!("[{}]", values.join(", "))
}

impl LogoutError {
    pub fn discovery_fetch_failed(message: impl Into<String>) -> Self {
        Self::DiscoveryFetchFailed {
            message: message.into(),
        }
    }

    pub fn discovery_parse_failed(message: impl Into<String>) -> Self {
        Self::DiscoveryParseFailed {
            message: message.into(),
        }
    }

    pub fn key_set_fetch_failed(message: impl Into<String>) -> Self {
        Self::KeySetFetchFailed {
            message: message.into(),
        }
    }

    pub fn key_set_parse_failed(message: impl Into<String>) -> Self {
        Self::KeySetParseFailed {
            message: message.into(),
        }
    }

    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::MalformedToken {
            message: message.into(),
        }
    }

    pub fn signature_invalid(message: impl Into<String>) -> Self {
        Self::SignatureInvalid {
            message: message.into(),
        }
    }

    /// Get the taxonomy family this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IssuerNotConfigured | Self::AudienceNotConfigured => ErrorKind::Configuration,
            Self::MissingLogoutToken | Self::NoHandlerProvided => ErrorKind::Request,
            _ => ErrorKind::Decode,
        }
    }

    pub fn is_decode_error(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }

    /// Get the HTTP status code a host should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::IssuerNotConfigured | Self::AudienceNotConfigured | Self::NoHandlerProvided => 500,
            Self::DiscoveryFetchFailed { .. } | Self::KeySetFetchFailed { .. } => 502,
            _ => 400,
        }
    }

    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::IssuerNotConfigured => "issuer_not_configured",
            Self::AudienceNotConfigured => "audience_not_configured",
            Self::MissingLogoutToken => "missing_logout_token",
            Self::NoHandlerProvided => "no_handler_provided",
            Self::DiscoveryFetchFailed { .. } => "discovery_fetch_failed",
            Self::DiscoveryParseFailed { .. } => "discovery_parse_failed",
            Self::JwksUriMissing => "jwks_uri_missing",
            Self::KeySetFetchFailed { .. } => "jwks_fetch_failed",
            Self::KeySetParseFailed { .. } => "jwks_parse_failed",
            Self::MalformedToken { .. } => "malformed_token",
            Self::InvalidAlgorithm { .. } => "invalid_algorithm",
            Self::KeyNotFound { .. } => "key_not_found",
            Self::SignatureInvalid { .. } => "signature_invalid",
            Self::InvalidIssuer { .. } => "invalid_issuer",
            Self::InvalidAudience { .. } => "invalid_audience",
            Self::MissingRequiredClaim { .. } => "missing_required_claim",
            Self::InvalidEvents => "invalid_events",
            Self::MissingSubOrSid => "missing_sub_or_sid",
            Self::InvalidNonce => "invalid_nonce",
            Self::TokenExpired { .. } => "token_expired",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&LogoutError> for ErrorResponse {
    fn from(err: &LogoutError) -> Self {
        Self {
            error: err.error_key().to_string(),
            message: err.to_string(),
        }
    }
}
