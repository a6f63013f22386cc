use http::StatusCode;
use thiserror::Error;

use crate::auth::validator::{AuthenticationOutcome, Principal};

const ROLE_PREFIX: &str = "ROLE_";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    #[error("authentication required")]
    Unauthenticated,
    #[error("missing required role")]
    Forbidden,
}

impl GateRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            GateRejection::Unauthenticated => StatusCode::UNAUTHORIZED,
            GateRejection::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl Principal {
    /// `has_role("ADMIN")` accepts either `ADMIN` or `ROLE_ADMIN`.
    pub fn has_role(&self, role: &str) -> bool {
        let bare = role.strip_prefix(ROLE_PREFIX).unwrap_or(role);
        self.roles
            .iter()
            .any(|held| held.strip_prefix(ROLE_PREFIX).unwrap_or(held) == bare)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

pub fn require_role<'a>(
    outcome: &'a AuthenticationOutcome,
    role: &str,
) -> Result<&'a Principal, GateRejection> {
    let principal = outcome.principal().ok_or(GateRejection::Unauthenticated)?;
    if principal.has_role(role) {
        Ok(principal)
    } else {
        Err(GateRejection::Forbidden)
    }
}
