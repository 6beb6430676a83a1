//! Mock implementations of platform traits and signed token fixtures for testing

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::oidc::BACKCHANNEL_LOGOUT_EVENT;
use crate::platform::{Clock, Environment, HttpClient, HttpError, HttpResponse};

/// Fixed "now" shared by validation tests
pub const TEST_TIMESTAMP: u64 = 1706900000;

/// Mock HTTP client with pre-configured responses.
///
/// A request matches the first pattern contained in its URL; unmatched
/// requests fail like a network error. Every requested URL is recorded.
pub struct MockHttp {
    responses: Vec<(String, HttpResponse)>,
    requests: Mutex<Vec<String>>,
}

impl MockHttp {
    pub fn new(responses: Vec<(String, HttpResponse)>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(url.to_string());

        for (pattern, response) in &self.responses {
            if url.contains(pattern) {
                return Ok(HttpResponse {
                    status: response.status,
                    body: response.body.clone(),
                });
            }
        }
        Err(HttpError::new(format!("no mock response for GET {}", url)))
    }
}

pub fn json_response(body: Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        body: body.to_string().into_bytes(),
    }
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.as_bytes().to_vec(),
    }
}

/// Mock clock with a fixed timestamp
pub struct MockClock(pub u64);

impl Clock for MockClock {
    fn now_secs(&self) -> u64 {
        self.0
    }
}

/// Mock environment backed by an in-memory HashMap
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    pub fn new(vars: &[(&str, &str)]) -> Self {
        Self {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Logout token payload that passes every check at `now`
pub fn logout_claims(now: u64) -> Value {
    json!({
        "iss": "https://idp.example.com",
        "aud": ["my-client-id"],
        "iat": now,
        "exp": now + 3600,
        "jti": "bWJq",
        "events": { BACKCHANNEL_LOGOUT_EVENT: {} },
        "sub": "u1",
    })
}

/// Token with an arbitrary `alg` header and an empty signature
pub fn unsigned_token(alg: &str, claims: &Value) -> String {
    let header = json!({ "alg": alg, "typ": "logout+jwt" });
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// RS256 signer standing in for an identity provider
pub struct TestSigner {
    encoding_key: EncodingKey,
    jwks: Value,
}

impl TestSigner {
    pub const KID: &'static str = "test-key";

    /// Generate a fresh RSA key pair at runtime (never touches disk)
    pub fn generate() -> Self {
        use rand::rngs::OsRng;
        use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
        use rsa::traits::PublicKeyParts;
        use rsa::RsaPrivateKey;

        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation failed");
        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private key PEM export failed");
        let encoding_key =
            EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("private key should be valid");

        let public_key = private_key.to_public_key();
        let jwks = json!({
            "keys": [{
                "kty": "RSA",
                "kid": Self::KID,
                "use": "sig",
                "alg": "RS256",
                "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
            }]
        });

        Self { encoding_key, jwks }
    }

    /// Key pair shared across tests; RSA generation is slow
    pub fn shared() -> &'static TestSigner {
        static SIGNER: OnceLock<TestSigner> = OnceLock::new();
        SIGNER.get_or_init(TestSigner::generate)
    }

    /// Public keys as a JWKS document
    pub fn jwks(&self) -> Value {
        self.jwks.clone()
    }

    pub fn key_set(&self) -> JwkSet {
        serde_json::from_value(self.jwks()).expect("JWKS should deserialize")
    }

    pub fn sign(&self, claims: &Value) -> String {
        self.sign_with_kid(Some(Self::KID), claims)
    }

    pub fn sign_with_kid(&self, kid: Option<&str>, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("logout+jwt".to_string());
        header.kid = kid.map(str::to_string);
        encode(&header, claims, &self.encoding_key).expect("signing should succeed")
    }
}
