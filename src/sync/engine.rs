use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::helpers::time::{get_instant, now_i64};
use crate::identity::provider::TokenProvider;
use crate::observability::metrics::get_metrics;
use crate::replica::plan::CatalogPlan;
use crate::replica::store::{ReplicaCounts, ReplicaKind, ReplicaStore};
use crate::sync::authority::AuthorityClient;

/// Which branch a sync cycle ended in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Snapshot applied in full.
    Replicated {
        counts: ReplicaCounts,
        skipped_rows: usize,
    },
    /// Empty snapshot: catalog withdrawn.
    Cleared,
    SkippedNoToken,
    /// Authority answered 401/403; the service token was dropped.
    AuthRejected { status: u16 },
    FetchFailed { reason: String },
    StoreFailed { reason: String },
}

impl SyncOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            SyncOutcome::Replicated { .. } => "replicated",
            SyncOutcome::Cleared => "cleared",
            SyncOutcome::SkippedNoToken => "skipped_no_token",
            SyncOutcome::AuthRejected { .. } => "auth_rejected",
            SyncOutcome::FetchFailed { .. } => "fetch_failed",
            SyncOutcome::StoreFailed { .. } => "store_failed",
        }
    }

    /// The store now mirrors the latest snapshot.
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Replicated { .. } | SyncOutcome::Cleared)
    }
}

/// Pulls the authority snapshot and reconciles it into the replica store.
///
/// The store is only written when a snapshot was fetched successfully; any
/// earlier failure leaves the previous replica in place until the next
/// cycle. Cycles never overlap, whichever trigger started them.
pub struct ReplicationEngine<S: ReplicaStore> {
    provider: Arc<TokenProvider>,
    authority: AuthorityClient,
    store: S,
    sync_lock: Mutex<()>,
}

impl<S: ReplicaStore> ReplicationEngine<S> {
    pub fn new(provider: Arc<TokenProvider>, authority: AuthorityClient, store: S) -> Self {
        Self {
            provider,
            authority,
            store,
            sync_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &Arc<TokenProvider> {
        &self.provider
    }

    pub async fn sync(&self) -> SyncOutcome {
        let _cycle = self.sync_lock.lock().await;
        let metrics = get_metrics().await;
        let start = get_instant();
        info!(snapshot_url = %self.authority.snapshot_url(), "sync cycle start");

        let outcome = self.run_cycle().await;

        metrics
            .sync_cycle_duration
            .observe(start.elapsed().as_secs_f64());
        metrics
            .sync_cycles
            .with_label_values(&[outcome.as_label()])
            .inc();
        if outcome.is_applied() {
            metrics.last_successful_sync_unix.set(now_i64());
        }
        info!(outcome = outcome.as_label(), "sync cycle finished");
        outcome
    }

    async fn run_cycle(&self) -> SyncOutcome {
        let Some(token) = self.provider.get_token().await else {
            warn!("no service token available, skipping sync cycle");
            return SyncOutcome::SkippedNoToken;
        };

        let rows = match self.authority.fetch_snapshot(&token).await {
            Ok(rows) => rows,
            Err(e) if e.is_auth_failure() => {
                warn!("{}, invalidating cached token", e);
                self.provider.invalidate().await;
                return SyncOutcome::AuthRejected {
                    status: e.status().map(|status| status.as_u16()).unwrap_or_default(),
                };
            }
            Err(e) => {
                error!("failed to fetch catalog snapshot: {}", e);
                return SyncOutcome::FetchFailed {
                    reason: e.to_string(),
                };
            }
        };

        if rows.is_empty() {
            info!("authority snapshot is empty, clearing replica");
            return match self.store.clear_all().await {
                Ok(()) => {
                    record_replica_counts(ReplicaCounts::default()).await;
                    SyncOutcome::Cleared
                }
                Err(e) => {
                    error!("failed to clear replica: {}", e);
                    SyncOutcome::StoreFailed {
                        reason: e.to_string(),
                    }
                }
            };
        }

        let plan = CatalogPlan::from_rows(&rows);
        let skipped_rows = plan.skipped_rows + plan.duplicate_showtimes;
        get_metrics()
            .await
            .sync_rows_skipped
            .inc_by(skipped_rows as u64);

        match self.store.replace_all(&plan).await {
            Ok(counts) => {
                info!(
                    shows = counts.shows,
                    venues = counts.venues,
                    showtimes = counts.showtimes,
                    skipped_rows,
                    "replica reconciled with authority snapshot"
                );
                record_replica_counts(counts).await;
                SyncOutcome::Replicated {
                    counts,
                    skipped_rows,
                }
            }
            Err(e) => {
                error!("failed to apply catalog snapshot, keeping previous replica: {}", e);
                SyncOutcome::StoreFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

async fn record_replica_counts(counts: ReplicaCounts) {
    let gauge = &get_metrics().await.replica_rows;
    gauge
        .with_label_values(&[ReplicaKind::Show.as_str()])
        .set(counts.shows as i64);
    gauge
        .with_label_values(&[ReplicaKind::Venue.as_str()])
        .set(counts.venues as i64);
    gauge
        .with_label_values(&[ReplicaKind::Showtime.as_str()])
        .set(counts.showtimes as i64);
}
