//! HTTP surface: read-only catalog API, manual sync trigger, health, metrics.

pub mod catalog;
pub mod extract;
pub mod internal;
pub mod server;

pub use server::{build_router, serve_until, start, AppState};
