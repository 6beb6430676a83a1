//! Back-channel logout executor
//!
//! Drives discovery, key resolution and token validation for one inbound
//! logout request, then dispatches the verified identifiers.

use crate::config::Config;
use crate::error::{LogoutError, Result};
use crate::oidc::{fetch_keys, resolve_jwks_uri, LogoutClaims, LogoutTokenValidator};
use crate::platform::{Clock, HttpClient};

use super::request::LogoutRequest;

/// Processes back-channel logout requests for one configured relying party
pub struct Executor<'a> {
    issuer: String,
    validator: LogoutTokenValidator,
    http: &'a dyn HttpClient,
    clock: &'a dyn Clock,
}

impl<'a> Executor<'a> {
    /// Issuer and audience are copied out of `config` here
    pub fn new(config: &Config, http: &'a dyn HttpClient, clock: &'a dyn Clock) -> Self {
        Self {
            issuer: config.issuer().to_string(),
            validator: LogoutTokenValidator::new(config.issuer(), config.audience()),
            http,
            clock,
        }
    }

    /// Verify the request's logout token and invoke `handler` with `(sub, sid)`.
    ///
    /// The handler runs at most once, only after every check has passed. Its
    /// error is returned as-is; executor errors are converted into `E`.
    pub async fn process<R, F, T, E>(&self, request: &R, handler: Option<F>) -> std::result::Result<T, E>
    where
        R: LogoutRequest + ?Sized,
        F: FnOnce(Option<String>, Option<String>) -> std::result::Result<T, E>,
        E: From<LogoutError>,
    {
        let claims = self.verify(request).await.inspect_err(|e| {
            tracing::warn!(error = e.error_key(), "rejected back-channel logout: {}", e);
        })?;

        let (sub, sid) = claims.into_subject_and_session();

        let handler = handler.ok_or(LogoutError::NoHandlerProvided)?;

        tracing::info!(sub = ?sub, sid = ?sid, "dispatching back-channel logout");
        handler(sub, sid)
    }

    /// Run every step short of dispatching to a handler
    pub async fn verify<R>(&self, request: &R) -> Result<LogoutClaims>
    where
        R: LogoutRequest + ?Sized,
    {
        let token = request
            .logout_token()
            .filter(|token| !token.is_empty())
            .ok_or(LogoutError::MissingLogoutToken)?;

        let jwks_uri = resolve_jwks_uri(&self.issuer, self.http).await?;
        let keys = fetch_keys(&jwks_uri, self.http).await?;

        self.validator.validate(token, &keys, self.clock)
    }
}
