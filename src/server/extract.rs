use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::auth::bearer::bearer_token;
use crate::auth::validator::AuthenticationOutcome;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;

/// The validator's verdict for this request, handed to handlers as a value.
///
/// Never rejects: a missing or bad token yields `Unauthenticated` and the
/// handler (or [`require_role`](crate::auth::gate::require_role)) decides.
#[derive(Debug, Clone)]
pub struct Authentication(pub AuthenticationOutcome);

impl FromRequestParts<AppState> for Authentication {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let verdict = state.validator.verify(bearer_token(&parts.headers));
        let label = match &verdict {
            Ok(_) => "authenticated",
            Err(rejection) => rejection.as_label(),
        };
        get_metrics()
            .await
            .auth_outcomes
            .with_label_values(&[label])
            .inc();

        Ok(Authentication(verdict.into()))
    }
}
