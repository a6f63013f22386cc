// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::Arc;

use base64::Engine;
use httpmock::MockServer;
use reqwest::Client;

use crate::auth::{SigningKey, TokenIssuer, TokenValidator};
use crate::config::service::{AuthorityConfig, IdentityConfig};
use crate::identity::TokenProvider;
use crate::replica::InMemoryReplicaStore;
use crate::sync::{AuthorityClient, ReplicationEngine};

pub const TEST_SECRET: &str = "test-signing-secret-0123456789-abcdef";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SNAPSHOT_PATH: &str = "/api/internal/data/admin/shows-for-catalog";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn signing_key() -> SigningKey {
    SigningKey::new(TEST_SECRET).expect("test secret is long enough")
}

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(&signing_key(), 3600)
}

pub fn test_validator() -> TokenValidator {
    TokenValidator::new(&signing_key())
}

/// Unsigned compact token whose payload carries `exp` (or none).
pub fn machine_token(exp: Option<i64>) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let payload = match exp {
        Some(exp) => json!({"sub": "catalog-sync-agent", "roles": "ROLE_ADMIN", "exp": exp}),
        None => json!({"sub": "catalog-sync-agent", "roles": "ROLE_ADMIN"}),
    };
    format!(
        "{}.{}.sig",
        engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        engine.encode(payload.to_string())
    )
}

pub fn identity_config(server: &MockServer) -> IdentityConfig {
    IdentityConfig {
        login_url: server.url(LOGIN_PATH),
        username: "catalog-sync-agent".to_owned(),
        password: "s3cret".to_owned(),
    }
}

pub fn authority_config(server: &MockServer) -> AuthorityConfig {
    AuthorityConfig {
        base_url: server.base_url(),
        snapshot_path: SNAPSHOT_PATH.to_owned(),
        timeout_ms: Some(5_000),
    }
}

pub fn token_provider(server: &MockServer) -> Arc<TokenProvider> {
    Arc::new(TokenProvider::new(build_reqwest_client(), identity_config(server)))
}

/// Engine wired to mocked identity and authority endpoints on one server.
pub fn engine_against(server: &MockServer) -> Arc<ReplicationEngine<InMemoryReplicaStore>> {
    Arc::new(ReplicationEngine::new(
        token_provider(server),
        AuthorityClient::new(build_reqwest_client(), &authority_config(server)),
        InMemoryReplicaStore::new(),
    ))
}

/// The single-row snapshot used throughout the replication tests.
pub fn single_row_snapshot() -> serde_json::Value {
    json!([{
        "showId": 1,
        "title": "X",
        "description": "A show",
        "genre": "Drama",
        "language": "English",
        "durationMinutes": 120,
        "releaseDate": "2029-12-01",
        "posterUrl": null,
        "venueId": 9,
        "venueName": "V",
        "venueAddress": "1 Main St",
        "venueCity": "Springfield",
        "venueCapacity": 300,
        "showtimeId": 100,
        "showDateTime": "2030-01-01T20:00",
        "pricePerSeat": 10.00,
        "totalSeats": 50
    }])
}
