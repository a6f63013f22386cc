//! Bearer token validation shared by every service boundary.
//!
//! The decision is made in four independent steps:
//!
//! 1. signature + structure (`Malformed` / `BadSignature`)
//! 2. expiry, evaluated only after the signature holds (`Expired`)
//! 3. subject and `roles` claims (`MissingClaims`)
//! 4. otherwise `Authenticated(subject, roles)`
//!
//! An expired token may still carry a valid signature; that case is
//! reported separately from a structurally invalid token, while both end
//! up `Unauthenticated`.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::key::SigningKey;
use crate::helpers::time::now_i64;

/// Authenticated caller, as carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub subject: String,
    pub roles: Vec<String>,
}

/// Result of validating one inbound request. Built per request, handed to
/// the authorization gate, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    Authenticated(Principal),
    Unauthenticated,
}

impl AuthenticationOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthenticationOutcome::Authenticated(principal) => Some(principal),
            AuthenticationOutcome::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

/// Why a token did not authenticate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("no bearer token presented")]
    Absent,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token signature validation failed")]
    BadSignature,
    /// `expired_at` is `None` when the token has no `exp` claim at all.
    #[error("token expired (exp: {expired_at:?})")]
    Expired { expired_at: Option<i64> },
    #[error("token lacks a subject or roles")]
    MissingClaims,
}

impl TokenRejection {
    pub fn as_label(&self) -> &'static str {
        match self {
            TokenRejection::Absent => "absent",
            TokenRejection::Malformed(_) => "malformed",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::Expired { .. } => "expired",
            TokenRejection::MissingClaims => "missing_claims",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
    roles: Option<String>,
    exp: Option<f64>,
}

#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // expiry is checked separately so an expired-but-signed token is told apart
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            key: key.decoding_key(),
            validation,
        }
    }

    /// Full decision with the reason for any rejection.
    pub fn verify(&self, token: Option<&str>) -> Result<Principal, TokenRejection> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenRejection::Absent)?;

        let claims = decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed(e.to_string()),
            })?;

        let expired_at = claims.exp.map(|exp| exp as i64);
        match expired_at {
            Some(exp) if exp > now_i64() => {}
            _ => return Err(TokenRejection::Expired { expired_at }),
        }

        let subject = claims
            .sub
            .filter(|sub| !sub.trim().is_empty())
            .ok_or(TokenRejection::MissingClaims)?;
        let roles = claims.roles.as_deref().map(split_roles).unwrap_or_default();
        if roles.is_empty() {
            return Err(TokenRejection::MissingClaims);
        }

        Ok(Principal { subject, roles })
    }

    /// Collapse [`verify`](Self::verify) into the outcome the authorization
    /// gate consumes.
    pub fn authenticate(&self, token: Option<&str>) -> AuthenticationOutcome {
        self.verify(token).into()
    }
}

impl From<Result<Principal, TokenRejection>> for AuthenticationOutcome {
    fn from(verdict: Result<Principal, TokenRejection>) -> Self {
        match verdict {
            Ok(principal) => {
                debug!(subject = %principal.subject, roles = ?principal.roles, "token authenticated");
                AuthenticationOutcome::Authenticated(principal)
            }
            Err(TokenRejection::Absent) => AuthenticationOutcome::Unauthenticated,
            Err(rejection) => {
                debug!(reason = rejection.as_label(), "token rejected: {}", rejection);
                AuthenticationOutcome::Unauthenticated
            }
        }
    }
}

/// `roles` travels as one comma-separated claim.
pub fn split_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_owned)
        .collect()
}
