use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Metric names and label sets below are static; construction can only fail on
// a programming error, hence the `expect`s.

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Initializes (once) and returns the process-wide metrics registry.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Sync cycle metrics
    pub sync_cycles: IntCounterVec,
    pub sync_cycle_duration: Histogram,
    pub sync_rows_skipped: IntCounter,
    pub replica_rows: IntGaugeVec,
    pub last_successful_sync_unix: IntGauge,

    // Identity metrics
    pub identity_fetch_requests: IntCounter,
    pub identity_fetch_failures: IntCounterVec,
    pub identity_fetch_duration: Histogram,
    pub credential_expiry_unix: IntGauge,
    pub credential_invalidations: IntCounter,

    // Inbound authentication
    pub auth_outcomes: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("catalogreplicator".into()), None)
            .expect("metrics registry");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Sync
            sync_cycles: IntCounterVec::new(Opts::new("sync_cycles_total", "Sync cycles by outcome"), &["outcome"]).expect("sync_cycles_total"),
            sync_cycle_duration: Histogram::with_opts(HistogramOpts::new("sync_cycle_duration_seconds", "Sync cycle duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])).expect("sync_cycle_duration_seconds"),
            sync_rows_skipped: IntCounter::new("sync_rows_skipped_total", "Upstream rows skipped for missing ids").expect("sync_rows_skipped_total"),
            replica_rows: IntGaugeVec::new(Opts::new("replica_rows", "Replica rows per kind"), &["kind"]).expect("replica_rows"),
            last_successful_sync_unix: IntGauge::new("last_successful_sync_unix_seconds", "Finish time of the last applied sync cycle").expect("last_successful_sync_unix_seconds"),

            // Identity
            identity_fetch_requests: IntCounter::new("identity_fetch_requests_total", "Machine token fetch attempts").expect("identity_fetch_requests_total"),
            identity_fetch_failures: IntCounterVec::new(Opts::new("identity_fetch_failures_total", "Machine token fetch failures by reason"), &["reason"]).expect("identity_fetch_failures_total"),
            identity_fetch_duration: Histogram::with_opts(HistogramOpts::new("identity_fetch_duration_seconds", "Machine token fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).expect("identity_fetch_duration_seconds"),
            credential_expiry_unix: IntGauge::new("credential_expiry_unix_seconds", "Expiry of the cached machine token").expect("credential_expiry_unix_seconds"),
            credential_invalidations: IntCounter::new("credential_invalidations_total", "Explicit cache invalidations").expect("credential_invalidations_total"),

            // Inbound
            auth_outcomes: IntCounterVec::new(Opts::new("auth_outcomes_total", "Inbound token validation outcomes"), &["outcome"]).expect("auth_outcomes_total"),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").expect("config_validation_errors_total"),
            up: IntGauge::new("up", "1 if service is healthy").expect("up"),

            registry,
        });

        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.sync_cycles.clone()),
            Box::new(metrics.sync_cycle_duration.clone()),
            Box::new(metrics.sync_rows_skipped.clone()),
            Box::new(metrics.replica_rows.clone()),
            Box::new(metrics.last_successful_sync_unix.clone()),
            Box::new(metrics.identity_fetch_requests.clone()),
            Box::new(metrics.identity_fetch_failures.clone()),
            Box::new(metrics.identity_fetch_duration.clone()),
            Box::new(metrics.credential_expiry_unix.clone()),
            Box::new(metrics.credential_invalidations.clone()),
            Box::new(metrics.auth_outcomes.clone()),
            Box::new(metrics.config_validation_errors.clone()),
            Box::new(metrics.up.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("metric registered once");
        }

        metrics
    }
}
