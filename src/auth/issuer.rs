use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::auth::key::SigningKey;
use crate::helpers::time::now_i64;

/// Claims minted by the identity issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedClaims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl IssuedClaims {
    pub fn new(subject: &str, roles: &[String], issued_at: i64, ttl_seconds: u64) -> Self {
        let roles = (!roles.is_empty()).then(|| roles.join(","));
        Self {
            sub: subject.to_owned(),
            roles,
            iat: issued_at,
            exp: issued_at + ttl_seconds as i64,
        }
    }
}

/// Mints HS256 compact tokens with the shared signing key.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(key: &SigningKey, ttl_seconds: u64) -> Self {
        Self {
            key: key.encoding_key(),
            ttl_seconds,
        }
    }

    pub fn issue(&self, subject: &str, roles: &[String]) -> jsonwebtoken::errors::Result<String> {
        self.sign(&IssuedClaims::new(subject, roles, now_i64(), self.ttl_seconds))
    }

    pub fn sign(&self, claims: &IssuedClaims) -> jsonwebtoken::errors::Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key)
    }
}
