//! Shared helpers for building signed test tokens
#![allow(dead_code)]

use aws_lc_rs::hmac;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value, json};
use tokenverdict::{ErrorKind, TokenValidation};

pub const SECRET: &[u8] = b"tokenverdict-test-secret";
pub const ISSUER: &str = "http://localhost:8080/uaa/oauth/token";

/// Builder for HS256 tokens with arbitrary claims
pub struct TokenBuilder {
    header: Value,
    claims: Map<String, Value>,
}

impl TokenBuilder {
    pub fn new() -> Self {
        Self {
            header: json!({"alg": "HS256", "typ": "JWT"}),
            claims: Map::new(),
        }
    }

    pub fn header(mut self, header: Value) -> Self {
        self.header = header;
        self
    }

    pub fn claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.claims.insert(name.to_string(), value.into());
        self
    }

    /// Claims of a token that passes every check in `standard_policy`
    pub fn standard_valid_claims(self) -> Self {
        self.claim("iss", ISSUER)
            .claim("exp", 4_102_444_800i64)
            .claim("user_id", "marissa")
            .claim("cid", "app")
            .claim("scope", json!(["openid", "cloud_controller.read"]))
            .claim("aud", json!(["app", "cloud_controller"]))
            .claim("rev_sig", "a1b2c3")
    }

    /// Encode header and claims, signing the input with `sign`
    pub fn sign_with(&self, sign: impl FnOnce(&[u8]) -> Vec<u8>) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(self.header.to_string());
        let payload_b64 = URL_SAFE_NO_PAD.encode(Value::Object(self.claims.clone()).to_string());
        let signing_input = format!("{header_b64}.{payload_b64}");

        let signature = sign(signing_input.as_bytes());
        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
    }

    pub fn sign(&self, secret: &[u8]) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
        self.sign_with(|input| hmac::sign(&key, input).as_ref().to_vec())
    }

    pub fn generate(&self) -> String {
        self.sign(SECRET)
    }
}

/// Token whose payload segment is arbitrary text
pub fn token_with_raw_payload(payload: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
        URL_SAFE_NO_PAD.encode(payload),
        URL_SAFE_NO_PAD.encode("sig")
    )
}

pub fn kinds(validation: &TokenValidation) -> Vec<ErrorKind> {
    validation.errors().iter().map(|e| e.kind()).collect()
}
