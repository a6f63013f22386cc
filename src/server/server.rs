use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tracing::{error, info};

use crate::auth::validator::TokenValidator;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;
use crate::replica::memory::InMemoryReplicaStore;
use crate::server::{catalog, internal};
use crate::sync::engine::ReplicationEngine;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub validator: Arc<TokenValidator>,
    pub store: InMemoryReplicaStore,
    pub engine: Arc<ReplicationEngine<InMemoryReplicaStore>>,
}

impl AppState {
    pub async fn new(
        validator: Arc<TokenValidator>,
        engine: Arc<ReplicationEngine<InMemoryReplicaStore>>,
    ) -> Self {
        let metrics = get_metrics().await;
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            validator,
            store: engine.store().clone(),
            engine,
        }
    }
}

pub fn build_router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(catalog::router())
        .merge(internal::router())
        .with_state(state)
}

/// Serve the catalog API until SIGTERM / Ctrl-C or a listener failure.
pub async fn start(settings_config: &SettingsConfig, state: AppState) -> Result<()> {
    serve_until(settings_config, state, shutdown_signal()).await
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve_until(
    settings_config: &SettingsConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(settings_config, state);

    let bind_addr = settings_config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("http server listening on {}", bind_addr);

    let metrics = get_metrics().await;
    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server stopped")?;
    metrics.up.set(0);
    info!("http server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received"),
        _ = terminate => info!("SIGTERM received"),
    }
}

async fn health() -> &'static str {
    "ok"
}
