use jsonwebtoken::{DecodingKey, EncodingKey};
use thiserror::Error;

/// HMAC secrets shorter than this are rejected.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing secret must be at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Shared HMAC signing key. Every boundary validates (and the identity
/// issuer signs) with the same secret, so one type carries it.
#[derive(Clone)]
pub struct SigningKey {
    secret: Vec<u8>,
}

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(KeyError::TooShort {
                min: MIN_SECRET_BYTES,
                actual: secret.len(),
            });
        }
        Ok(Self { secret })
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.secret.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        let err = SigningKey::new("too-short").unwrap_err();
        assert_eq!(err, KeyError::TooShort { min: 32, actual: 9 });
    }

    #[test]
    fn secret_of_minimum_length_is_accepted() {
        assert!(SigningKey::new(vec![b'k'; MIN_SECRET_BYTES]).is_ok());
    }
}
