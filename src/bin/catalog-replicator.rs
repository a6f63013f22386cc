use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_replicator::auth::TokenValidator;
use catalog_replicator::identity::TokenProvider;
use catalog_replicator::replica::InMemoryReplicaStore;
use catalog_replicator::server;
use catalog_replicator::sync::scheduler;
use catalog_replicator::sync::{AuthorityClient, ReplicationEngine};
use catalog_replicator::utils::config_loader;
use catalog_replicator::utils::logging;
use catalog_replicator::utils::logging::LogLevel;
use clap::Parser;
use reqwest::Client;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "catalog-replicator.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read CLI / env
    // -------------------------------

    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, start logging
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level).await?;

    // -------------------------------
    // 3. Inbound trust: signing key + validator
    // -------------------------------

    let signing_key = service_config
        .auth
        .signing_key()
        .context("auth.jwt_secret is not usable")?;
    let validator = Arc::new(TokenValidator::new(&signing_key));

    // -------------------------------
    // 4. Create request client
    // -------------------------------

    let mut client_builder = Client::builder();
    if let Some(timeout) = service_config.authority.timeout() {
        client_builder = client_builder.timeout(timeout);
    }
    let client = client_builder.build().context("failed to build http client")?;

    // -------------------------------
    // REPLICATION
    // -------------------------------

    // -------------------------------
    // 5. Machine identity + authority client + replica
    // -------------------------------

    let provider = Arc::new(TokenProvider::new(
        client.clone(),
        service_config.identity.clone(),
    ));
    let authority = AuthorityClient::new(client, &service_config.authority);
    let store = InMemoryReplicaStore::new();
    let engine = Arc::new(ReplicationEngine::new(provider, authority, store));

    // -------------------------------
    // 6. Fixed-rate sync trigger
    // -------------------------------

    let sync_loop = scheduler::run_fixed_rate(engine.clone(), service_config.sync.clone());

    // -------------------------------
    // HTTP
    // -------------------------------

    // -------------------------------
    // 7. Catalog API, admin trigger, health, metrics
    // -------------------------------

    let state = server::AppState::new(validator, engine).await;
    let http_server = server::start(&service_config.settings, state);

    info!("Service starting...");
    // the sync loop only ends on error; the server also ends on shutdown
    tokio::select! {
        res = sync_loop => res?,
        res = http_server => res?,
    }

    info!("Service stopped");
    Ok(())
}
