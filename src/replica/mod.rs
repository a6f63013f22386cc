//! Local replica of the catalog: wire rows, the reconciliation plan and
//! storage of materialized generations.

pub mod memory;
pub mod model;
pub mod plan;
pub mod store;

pub use memory::InMemoryReplicaStore;
pub use model::{Show, Showtime, UpstreamRow, Venue};
pub use plan::CatalogPlan;
pub use store::{ReplicaCounts, ReplicaGeneration, ReplicaKind, ReplicaStore, StoreError};
