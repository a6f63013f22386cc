use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::service::SyncConfig;
use crate::replica::store::ReplicaStore;
use crate::sync::engine::ReplicationEngine;

/// Fixed-rate trigger: first cycle after `initial_delay`, then one per `rate`.
///
/// A cycle that overruns its slot swallows the missed ticks instead of
/// firing them back to back.
pub async fn run_fixed_rate<S>(engine: Arc<ReplicationEngine<S>>, sync_config: SyncConfig) -> Result<()>
where
    S: ReplicaStore + 'static,
{
    let rate = sync_config.rate().max(Duration::from_millis(1));
    info!(
        "sync scheduler armed: initial delay {:?}, rate {:?}",
        sync_config.initial_delay(),
        rate
    );

    let mut ticker = interval_at(Instant::now() + sync_config.initial_delay(), rate);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let outcome = engine.sync().await;
        debug!(?outcome, "scheduled sync cycle done");
    }
}
