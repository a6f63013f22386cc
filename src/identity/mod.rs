//! Outbound machine identity: a cached, self-refreshing service token.

pub mod claims;
pub mod credential;
pub mod provider;

pub use credential::CachedCredential;
pub use provider::{IdentityError, TokenProvider};
