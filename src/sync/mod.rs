//! Replication: authority snapshot client, the engine and its trigger.

pub mod authority;
pub mod engine;
pub mod scheduler;

pub use authority::{AuthorityClient, FetchError};
pub use engine::{ReplicationEngine, SyncOutcome};
