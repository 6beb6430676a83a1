//! Relying-party configuration

use crate::error::{LogoutError, Result};
use crate::platform::Environment;

/// Environment variable holding the OpenID Provider issuer
pub const ISSUER_ENV: &str = "OIDC_ISSUER";

/// Environment variable holding this relying party's client id
pub const AUDIENCE_ENV: &str = "OIDC_CLIENT_ID";

/// Issuer/audience pair every logout token is checked against.
///
/// Built once at startup and handed to the executor by reference. There is no
/// way to obtain a `Config` with an empty field through the public API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    issuer: String,
    audience: String,
}

impl Config {
    /// Set issuer and audience, then validate them
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Result<Self> {
        let config = Self {
            issuer: issuer.into(),
            audience: audience.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        Self::new(
            env.get_var(ISSUER_ENV).unwrap_or_default(),
            env.get_var(AUDIENCE_ENV).unwrap_or_default(),
        )
    }

    /// Fail with the first unset field, issuer before audience
    pub fn validate(&self) -> Result<()> {
        if self.issuer.trim().is_empty() {
            return Err(LogoutError::IssuerNotConfigured);
        }
        if self.audience.trim().is_empty() {
            return Err(LogoutError::AudienceNotConfigured);
        }
        Ok(())
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockEnv;

    #[test]
    fn test_new_sets_fields() {
        let config = Config::new("https://idp.example.com", "my-client-id").unwrap();
        assert_eq!(config.issuer(), "https://idp.example.com");
        assert_eq!(config.audience(), "my-client-id");
    }

    #[test]
    fn test_empty_issuer_rejected() {
        let result = Config::new("", "my-client-id");
        assert_eq!(result.unwrap_err(), LogoutError::IssuerNotConfigured);
    }

    #[test]
    fn test_blank_issuer_rejected() {
        let result = Config::new("   ", "my-client-id");
        assert_eq!(result.unwrap_err(), LogoutError::IssuerNotConfigured);
    }

    #[test]
    fn test_empty_audience_rejected() {
        let result = Config::new("https://idp.example.com", "");
        assert_eq!(result.unwrap_err(), LogoutError::AudienceNotConfigured);
    }

    #[test]
    fn test_issuer_checked_first() {
        let result = Config::new("", "");
        assert_eq!(result.unwrap_err(), LogoutError::IssuerNotConfigured);
    }

    #[test]
    fn test_from_env() {
        let env = MockEnv::new(&[
            (ISSUER_ENV, "https://idp.example.com"),
            (AUDIENCE_ENV, "my-client-id"),
        ]);
        let config = Config::from_env(&env).unwrap();
        assert_eq!(config.issuer(), "https://idp.example.com");
        assert_eq!(config.audience(), "my-client-id");
    }

    #[test]
    fn test_from_env_missing_audience() {
        let env = MockEnv::new(&[(ISSUER_ENV, "https://idp.example.com")]);
        let result = Config::from_env(&env);
        assert_eq!(result.unwrap_err(), LogoutError::AudienceNotConfigured);
    }

    #[test]
    fn test_from_env_missing_everything() {
        let env = MockEnv::new(&[]);
        let result = Config::from_env(&env);
        assert_eq!(result.unwrap_err(), LogoutError::IssuerNotConfigured);
    }
}
