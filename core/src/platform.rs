//! Platform abstraction traits
//!
//! These traits define the boundary between the protocol logic and whatever
//! host runs it (a native server, a test harness, an embedding framework).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Transport-level failure reported by an [`HttpClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpError {
    pub message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// HTTP client for outbound requests (OIDC discovery, JWKS)
#[async_trait(?Send)]
pub trait HttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, HttpError>;
}

/// HTTP response from an outbound request
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Clock for current time (enables testing with deterministic timestamps)
pub trait Clock {
    fn now_secs(&self) -> u64;
}

/// Environment variable access
pub trait Environment {
    fn get_var(&self, name: &str) -> Option<String>;
}
