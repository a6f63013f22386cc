use http::StatusCode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::service::IdentityConfig;
use crate::helpers::time::{display_unix_ts, get_instant};
use crate::identity::claims::peek_expiry;
use crate::identity::credential::CachedCredential;
use crate::observability::metrics::get_metrics;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("identity endpoint answered {0}")]
    Status(StatusCode),
    #[error("identity response is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("identity response carries no token")]
    MissingToken,
}

impl IdentityError {
    pub fn as_label(&self) -> &'static str {
        match self {
            IdentityError::Transport(_) => "transport",
            IdentityError::Status(_) => "status",
            IdentityError::Decode(_) => "decode",
            IdentityError::MissingToken => "missing_token",
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "usernameOrEmail")]
    username_or_email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Machine-identity token cache used for outbound calls.
///
/// Constructed once per process and shared by reference with the
/// replication engine. The cache lock is held across a refetch, so callers
/// are serialised and never race on read-then-write.
pub struct TokenProvider {
    client: Client,
    identity: IdentityConfig,
    cache: Mutex<Option<CachedCredential>>,
}

impl TokenProvider {
    pub fn new(client: Client, identity: IdentityConfig) -> Self {
        Self {
            client,
            identity,
            cache: Mutex::new(None),
        }
    }

    /// Cached token while outside the refresh buffer, otherwise a fresh one.
    /// `None` means no token is available right now; the cache is cleared.
    pub async fn get_token(&self) -> Option<String> {
        let mut cache = self.cache.lock().await;

        if let Some(credential) = cache.as_ref().filter(|credential| credential.is_fresh()) {
            debug!(
                "reusing cached service token, refresh at {}",
                display_unix_ts(credential.refresh_at())
            );
            return Some(credential.token.clone());
        }

        match self.fetch_credential().await {
            Ok(credential) => {
                info!(
                    "new service token obtained, expires at {}",
                    display_unix_ts(credential.expires_at_unix_ts)
                );
                get_metrics()
                    .await
                    .credential_expiry_unix
                    .set(credential.expires_at_unix_ts);
                let token = credential.token.clone();
                *cache = Some(credential);
                Some(token)
            }
            Err(e) => {
                error!(login_url = %self.identity.login_url, "failed to fetch service token: {}", e);
                get_metrics()
                    .await
                    .identity_fetch_failures
                    .with_label_values(&[e.as_label()])
                    .inc();
                *cache = None;
                None
            }
        }
    }

    /// Drop the cached token so the next `get_token` fetches.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        if cache.take().is_some() {
            info!("cached service token invalidated");
        }
        get_metrics().await.credential_invalidations.inc();
    }

    /// Snapshot of the cache, for diagnostics.
    pub async fn cached(&self) -> Option<CachedCredential> {
        self.cache.lock().await.clone()
    }

    async fn fetch_credential(&self) -> Result<CachedCredential, IdentityError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.identity_fetch_requests.inc();
        info!(login_url = %self.identity.login_url, "fetching service token");

        let result = self.request_token().await;
        metrics
            .identity_fetch_duration
            .observe(start.elapsed().as_secs_f64());

        let token = result?;
        let claimed_exp = match peek_expiry(&token) {
            Ok(exp) => Some(exp),
            Err(e) => {
                warn!("could not read service token expiry, using default cache time: {}", e);
                None
            }
        };
        Ok(CachedCredential::with_claimed_expiry(token, claimed_exp))
    }

    async fn request_token(&self) -> Result<String, IdentityError> {
        let body = LoginRequest {
            username_or_email: &self.identity.username,
            password: &self.identity.password,
        };

        let response = self
            .client
            .post(&self.identity.login_url)
            .json(&body)
            .send()
            .await
            .map_err(IdentityError::Transport)?;

        if !response.status().is_success() {
            return Err(IdentityError::Status(response.status()));
        }

        let login: LoginResponse = response.json().await.map_err(IdentityError::Decode)?;
        login
            .token
            .filter(|token| !token.is_empty())
            .ok_or(IdentityError::MissingToken)
    }
}
