use http::StatusCode;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::service::AuthorityConfig;
use crate::replica::model::UpstreamRow;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authority rejected the service token: {0}")]
    Unauthorized(StatusCode),
    #[error("authority answered {0}")]
    Status(StatusCode),
    #[error("snapshot request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("snapshot body is not a valid row array: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// 401/403 from the authority: the cached service token must go.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::Unauthorized(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Unauthorized(status) | FetchError::Status(status) => Some(*status),
            FetchError::Transport(e) | FetchError::Decode(e) => e.status(),
        }
    }
}

/// Reads the denormalized catalog snapshot from the authority service.
#[derive(Clone)]
pub struct AuthorityClient {
    client: Client,
    snapshot_url: String,
}

impl AuthorityClient {
    pub fn new(client: Client, authority: &AuthorityConfig) -> Self {
        Self {
            client,
            snapshot_url: authority.snapshot_url(),
        }
    }

    pub fn snapshot_url(&self) -> &str {
        &self.snapshot_url
    }

    pub async fn fetch_snapshot(&self, token: &str) -> Result<Vec<UpstreamRow>, FetchError> {
        let response = self
            .client
            .get(&self.snapshot_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthorized(status));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let rows: Vec<UpstreamRow> = response.json().await.map_err(FetchError::Decode)?;
        debug!(rows = rows.len(), "snapshot received");
        Ok(rows)
    }
}
