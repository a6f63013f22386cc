use crate::helpers::time::now_i64;

/// Refresh this long before the credential actually lapses.
pub const REFRESH_BUFFER_SECONDS: i64 = 5 * 60;

/// Validity assumed when the token does not reveal its own expiry.
pub const FALLBACK_VALIDITY_SECONDS: i64 = 30 * 60;

/// Machine-identity token plus the instant it stops being usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCredential {
    pub token: String,
    pub expires_at_unix_ts: i64, // UNIX TIMESTAMP
}

impl CachedCredential {
    pub fn new(token: String, expires_at_unix_ts: i64) -> Self {
        Self {
            token,
            expires_at_unix_ts,
        }
    }

    /// Expiry from the token's own claim, or the fallback window from now.
    pub fn with_claimed_expiry(token: String, claimed_exp: Option<i64>) -> Self {
        let expires_at = claimed_exp.unwrap_or_else(|| now_i64() + FALLBACK_VALIDITY_SECONDS);
        Self::new(token, expires_at)
    }

    /// Unix timestamp from which the credential must be refetched.
    pub fn refresh_at(&self) -> i64 {
        self.expires_at_unix_ts.saturating_sub(REFRESH_BUFFER_SECONDS)
    }

    pub fn is_fresh_at(&self, now_unix_ts: i64) -> bool {
        now_unix_ts < self.refresh_at()
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(now_i64())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn freshness_respects_refresh_buffer() {
        let credential = CachedCredential::new("t".into(), 10_000);
        assert!(credential.is_fresh_at(10_000 - REFRESH_BUFFER_SECONDS - 1));
        assert!(!credential.is_fresh_at(10_000 - REFRESH_BUFFER_SECONDS));
        assert!(!credential.is_fresh_at(10_000));
    }

    #[test]
    fn missing_claim_falls_back_to_thirty_minutes() {
        let before = now_i64();
        let credential = CachedCredential::with_claimed_expiry("t".into(), None);
        let after = now_i64();
        assert!(credential.expires_at_unix_ts >= before + FALLBACK_VALIDITY_SECONDS);
        assert!(credential.expires_at_unix_ts <= after + FALLBACK_VALIDITY_SECONDS);
        assert!(credential.is_fresh());
    }

    #[test]
    fn claimed_expiry_is_taken_verbatim() {
        let credential = CachedCredential::with_claimed_expiry("t".into(), Some(42));
        assert_eq!(credential.expires_at_unix_ts, 42);
        assert!(!credential.is_fresh());
    }
}
