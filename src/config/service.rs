use serde::Deserialize;
use std::time::Duration;

use crate::auth::issuer::TokenIssuer;
use crate::auth::key::{KeyError, SigningKey};
use crate::config::settings::SettingsConfig;

pub const SNAPSHOT_PATH_DEFAULT: &str = "/api/internal/data/admin/shows-for-catalog";
pub const SYNC_RATE_MS_DEFAULT: u64 = 300_000;
pub const SYNC_INITIAL_DELAY_MS_DEFAULT: u64 = 20_000;
pub const TOKEN_TTL_SECONDS_DEFAULT: u64 = 86_400;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub identity: IdentityConfig,
    pub authority: AuthorityConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    pub auth: AuthConfig,
}

/// ================================
/// Machine identity used for outbound calls
/// ================================
#[derive(Clone, Deserialize)]
pub struct IdentityConfig {
    pub login_url: String,
    pub username: String,
    pub password: String,
}

// password stays out of logs
impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("login_url", &self.login_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// ================================
/// Catalog authority (snapshot source)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct AuthorityConfig {
    pub base_url: String,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    pub timeout_ms: Option<u64>,
}

impl AuthorityConfig {
    pub fn snapshot_url(&self) -> String {
        let path = if self.snapshot_path.starts_with('/') {
            self.snapshot_path.clone()
        } else {
            format!("/{}", self.snapshot_path)
        };
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// ================================
/// Fixed-rate schedule
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "default_rate_ms")]
    pub rate_ms: u64,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rate_ms: SYNC_RATE_MS_DEFAULT,
            initial_delay_ms: SYNC_INITIAL_DELAY_MS_DEFAULT,
        }
    }
}

impl SyncConfig {
    pub fn rate(&self) -> Duration {
        Duration::from_millis(self.rate_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// ================================
/// Token signing
/// ================================
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl AuthConfig {
    pub fn signing_key(&self) -> Result<SigningKey, KeyError> {
        SigningKey::new(self.jwt_secret.as_bytes())
    }

    /// Issuer minting tokens valid for `token_ttl_seconds`.
    pub fn token_issuer(&self) -> Result<TokenIssuer, KeyError> {
        Ok(TokenIssuer::new(&self.signing_key()?, self.token_ttl_seconds))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

fn default_snapshot_path() -> String {
    SNAPSHOT_PATH_DEFAULT.to_owned()
}

fn default_rate_ms() -> u64 {
    SYNC_RATE_MS_DEFAULT
}

fn default_initial_delay_ms() -> u64 {
    SYNC_INITIAL_DELAY_MS_DEFAULT
}

fn default_token_ttl_seconds() -> u64 {
    TOKEN_TTL_SECONDS_DEFAULT
}
