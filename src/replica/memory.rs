use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::replica::plan::CatalogPlan;
use crate::replica::store::{ReplicaCounts, ReplicaGeneration, ReplicaStore, StoreError};

/// Process-local replica store.
///
/// A new generation is fully built off to the side and swapped in under the
/// write lock, so readers see either the old catalog or the new one. Local
/// ids come from a monotonic sequence and are never reused across
/// generations.
#[derive(Clone)]
pub struct InMemoryReplicaStore {
    current: Arc<RwLock<Arc<ReplicaGeneration>>>,
    sequence: Arc<AtomicI64>,
}

impl InMemoryReplicaStore {
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(ReplicaGeneration::empty()))),
            sequence: Arc::new(AtomicI64::new(0)),
        }
    }
}

impl Default for InMemoryReplicaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicaStore for InMemoryReplicaStore {
    async fn replace_all(&self, plan: &CatalogPlan) -> Result<ReplicaCounts, StoreError> {
        let sequence = &self.sequence;
        let generation =
            ReplicaGeneration::build(plan, || sequence.fetch_add(1, Ordering::Relaxed) + 1)?;
        let counts = generation.counts();

        *self.current.write().await = Arc::new(generation);
        debug!(?counts, "replica generation swapped in");
        Ok(counts)
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        *self.current.write().await = Arc::new(ReplicaGeneration::empty());
        debug!("replica cleared");
        Ok(())
    }

    async fn current(&self) -> Arc<ReplicaGeneration> {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod test {
    use super::InMemoryReplicaStore;
    use crate::replica::model::UpstreamRow;
    use crate::replica::plan::CatalogPlan;
    use crate::replica::store::ReplicaStore;

    fn rows() -> Vec<UpstreamRow> {
        vec![UpstreamRow {
            show_id: Some(1),
            venue_id: Some(9),
            showtime_id: Some(100),
            ..Default::default()
        }]
    }

    #[tokio::test]
    async fn readers_keep_their_generation_across_a_swap() {
        let store = InMemoryReplicaStore::new();
        store.replace_all(&CatalogPlan::from_rows(&rows())).await.unwrap();

        let before = store.current().await;
        store.clear_all().await.unwrap();

        assert_eq!(before.counts().showtimes, 1);
        assert_eq!(store.current().await.counts().showtimes, 0);
    }

    #[tokio::test]
    async fn local_ids_are_not_reused_between_generations() {
        let store = InMemoryReplicaStore::new();
        let plan = CatalogPlan::from_rows(&rows());

        store.replace_all(&plan).await.unwrap();
        let first = store.current().await.show_by_upstream_id(1).unwrap().id;
        store.replace_all(&plan).await.unwrap();
        let second = store.current().await.show_by_upstream_id(1).unwrap().id;

        assert_ne!(first, second);
    }
}
