//! # Catalog Replicator
//!
//! Keeps a public, read-only replica of the show catalog in sync with the
//! catalog authority service, and validates the bearer tokens presented at
//! every service boundary.
//!
//! Modules:
//! - `identity`: cached machine token used for outbound calls
//! - `sync`: authority snapshot client, replication engine, fixed-rate trigger
//! - `replica`: replica rows, reconciliation plan, replica store
//! - `auth`: token validation, issuing, role gate
//! - `server`: read-only catalog API and manual sync trigger
//! - `config`: YAML service configuration

pub mod auth;
pub mod config;
pub mod helpers;
pub mod identity;
pub mod observability;
pub mod replica;
pub mod server;
pub mod sync;
pub mod utils;

#[cfg(test)]
mod tests;
