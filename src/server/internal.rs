use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, warn};

use crate::auth::gate::require_role;
use crate::server::extract::Authentication;
use crate::server::server::AppState;

pub const SYNC_TRIGGER_ROLE: &str = "ADMIN";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/internal/catalog/sync", post(trigger_sync))
}

/// Run one sync cycle now; waits for any cycle already in flight.
async fn trigger_sync(State(state): State<AppState>, Authentication(outcome): Authentication) -> Response {
    let principal = match require_role(&outcome, SYNC_TRIGGER_ROLE) {
        Ok(principal) => principal,
        Err(rejection) => {
            warn!("manual sync refused: {}", rejection);
            return (rejection.status(), rejection.to_string()).into_response();
        }
    };

    info!(subject = %principal.subject, "manual sync requested");
    Json(state.engine.sync().await).into_response()
}
