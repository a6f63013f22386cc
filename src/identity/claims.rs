//! Unverified peek at a compact token's payload.
//!
//! The provider only needs the token's own `exp` to schedule a refresh; it
//! never trusts anything else it reads here.

use anyhow::{anyhow, Result};
use base64::Engine;
use serde_json::Value;

fn decode_payload(token: &str) -> Result<Value> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| anyhow!("token has no payload segment"))?;

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    serde_json::from_slice::<Value>(&decoded).map_err(|e| anyhow!("invalid token payload: {}", e))
}

/// `exp` (seconds since epoch) from the second segment, if it is a number.
pub fn peek_expiry(token: &str) -> Result<i64> {
    let claims = decode_payload(token)?;
    let exp = claims
        .get("exp")
        .ok_or_else(|| anyhow!("'exp' claim not found"))?;

    exp.as_i64()
        .or_else(|| exp.as_f64().map(|exp| exp as i64))
        .ok_or_else(|| anyhow!("'exp' claim is not a number"))
}

#[cfg(test)]
mod test {
    use super::peek_expiry;
    use base64::Engine;

    fn token_with_payload(payload: &str) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.sig",
            engine.encode(r#"{"alg":"HS256"}"#),
            engine.encode(payload)
        )
    }

    #[test]
    fn reads_integer_exp() {
        let token = token_with_payload(r#"{"sub":"svc","exp":1900000000}"#);
        assert_eq!(peek_expiry(&token).unwrap(), 1_900_000_000);
    }

    #[test]
    fn reads_fractional_exp() {
        let token = token_with_payload(r#"{"exp":1900000000.75}"#);
        assert_eq!(peek_expiry(&token).unwrap(), 1_900_000_000);
    }

    #[test]
    fn missing_or_non_numeric_exp_is_an_error() {
        assert!(peek_expiry(&token_with_payload(r#"{"sub":"svc"}"#)).is_err());
        assert!(peek_expiry(&token_with_payload(r#"{"exp":"soon"}"#)).is_err());
    }

    #[test]
    fn opaque_tokens_are_an_error() {
        assert!(peek_expiry("opaque-token").is_err());
        assert!(peek_expiry("a.!!!.c").is_err());
    }
}
