use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDateTime;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::helpers::serde_time::option_local_date_time;
use crate::replica::model::{Show, Showtime};
use crate::replica::store::ReplicaStore;
use crate::server::extract::Authentication;
use crate::server::server::AppState;

/// Read-only catalog routes, served from the current replica generation.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shows", get(list_shows))
        .route("/api/shows/search", get(search_shows))
        .route("/api/shows/genre/{genre}", get(shows_by_genre))
        .route("/api/shows/{id}", get(get_show))
        .route("/api/shows/{id}/showtimes", get(showtimes_for_show))
        .route(
            "/api/shows/showtimes/{id}/details-for-booking",
            get(showtime_booking_details),
        )
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    pub title: String,
}

/// What the booking service needs to price and reserve a showtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub original_showtime_id: i64,
    pub show_title: Option<String>,
    pub venue_name: Option<String>,
    #[serde(with = "option_local_date_time")]
    pub show_date_time: Option<NaiveDateTime>,
    pub price_per_seat: Option<f64>,
    pub available_seats: i32,
}

fn not_found(kind: &str, id: i64) -> Response {
    (StatusCode::NOT_FOUND, format!("{} {} not found", kind, id)).into_response()
}

fn log_caller(auth: &Authentication, route: &str) {
    match auth.0.principal() {
        Some(principal) => debug!(subject = %principal.subject, route, "catalog read"),
        None => debug!(route, "anonymous catalog read"),
    }
}

async fn list_shows(State(state): State<AppState>, auth: Authentication) -> Json<Vec<Show>> {
    log_caller(&auth, "list_shows");
    let generation = state.store.current().await;
    Json(generation.shows().cloned().collect())
}

async fn get_show(
    State(state): State<AppState>,
    auth: Authentication,
    Path(id): Path<i64>,
) -> Response {
    log_caller(&auth, "get_show");
    let generation = state.store.current().await;
    match generation.show(id) {
        Some(show) => Json(show.clone()).into_response(),
        None => not_found("show", id),
    }
}

async fn search_shows(
    State(state): State<AppState>,
    auth: Authentication,
    Query(query): Query<TitleQuery>,
) -> Json<Vec<Show>> {
    log_caller(&auth, "search_shows");
    let generation = state.store.current().await;
    Json(
        generation
            .search_by_title(&query.title)
            .into_iter()
            .cloned()
            .collect(),
    )
}

async fn shows_by_genre(
    State(state): State<AppState>,
    auth: Authentication,
    Path(genre): Path<String>,
) -> Json<Vec<Show>> {
    log_caller(&auth, "shows_by_genre");
    let generation = state.store.current().await;
    Json(generation.shows_by_genre(&genre).into_iter().cloned().collect())
}

async fn showtimes_for_show(
    State(state): State<AppState>,
    auth: Authentication,
    Path(id): Path<i64>,
) -> Response {
    log_caller(&auth, "showtimes_for_show");
    let generation = state.store.current().await;
    if generation.show(id).is_none() {
        return not_found("show", id);
    }
    let showtimes: Vec<Showtime> = generation
        .showtimes_for_show(id)
        .into_iter()
        .cloned()
        .collect();
    Json(showtimes).into_response()
}

async fn showtime_booking_details(
    State(state): State<AppState>,
    auth: Authentication,
    Path(id): Path<i64>,
) -> Response {
    log_caller(&auth, "showtime_booking_details");
    let generation = state.store.current().await;
    let Some(showtime) = generation.showtime(id) else {
        return not_found("showtime", id);
    };

    Json(BookingDetails {
        original_showtime_id: showtime.upstream_id,
        show_title: generation
            .show(showtime.show_id)
            .and_then(|show| show.title.clone()),
        venue_name: generation
            .venue(showtime.venue_id)
            .and_then(|venue| venue.name.clone()),
        show_date_time: showtime.show_date_time,
        price_per_seat: showtime.price_per_seat,
        available_seats: showtime.total_seats,
    })
    .into_response()
}
