//! Inbound logout request parameters

use std::collections::HashMap;

/// Form field carrying the logout token
pub const LOGOUT_TOKEN_PARAM: &str = "logout_token";

/// A request the executor can pull a logout token from
pub trait LogoutRequest {
    fn logout_token(&self) -> Option<&str>;
}

impl LogoutRequest for HashMap<String, String> {
    fn logout_token(&self) -> Option<&str> {
        self.get(LOGOUT_TOKEN_PARAM).map(String::as_str)
    }
}

/// Decoded request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutRequestParams {
    params: HashMap<String, String>,
}

impl LogoutRequestParams {
    /// Parse an `application/x-www-form-urlencoded` body.
    ///
    /// Later occurrences of a repeated field win.
    pub fn from_form_body(body: &[u8]) -> Self {
        url::form_urlencoded::parse(body).into_owned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for LogoutRequestParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl LogoutRequest for LogoutRequestParams {
    fn logout_token(&self) -> Option<&str> {
        self.get(LOGOUT_TOKEN_PARAM)
    }
}
