use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::helpers::serde_time::option_local_date_time;

/// One denormalized show + venue + showtime record from the authority.
///
/// Every field is nullable on the wire; missing fields read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamRow {
    pub show_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub duration_minutes: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub poster_url: Option<String>,

    pub venue_id: Option<i64>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub venue_city: Option<String>,
    pub venue_capacity: Option<i32>,

    pub showtime_id: Option<i64>,
    #[serde(with = "option_local_date_time")]
    pub show_date_time: Option<NaiveDateTime>,
    pub price_per_seat: Option<f64>,
    pub total_seats: Option<i32>,
}

/// ================================
/// Replica rows (local id space)
/// ================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: i64,
    pub upstream_id: i64,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: i64,
    pub upstream_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub duration_minutes: i32,
    pub release_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    pub id: i64,
    pub upstream_id: i64,
    /// local id of the owning show replica
    pub show_id: i64,
    /// local id of the hosting venue replica
    pub venue_id: i64,
    #[serde(with = "option_local_date_time")]
    pub show_date_time: Option<NaiveDateTime>,
    pub price_per_seat: Option<f64>,
    pub total_seats: i32,
}

/// ================================
/// Drafts (rows before a local id is assigned)
/// ================================
#[derive(Debug, Clone, PartialEq)]
pub struct VenueDraft {
    pub upstream_id: i64,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: i32,
}

impl VenueDraft {
    pub fn from_row(upstream_id: i64, row: &UpstreamRow) -> Self {
        Self {
            upstream_id,
            name: row.venue_name.clone(),
            address: row.venue_address.clone(),
            city: row.venue_city.clone(),
            capacity: row.venue_capacity.unwrap_or_default(),
        }
    }

    pub fn into_replica(self, id: i64) -> Venue {
        Venue {
            id,
            upstream_id: self.upstream_id,
            name: self.name,
            address: self.address,
            city: self.city,
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowDraft {
    pub upstream_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub duration_minutes: i32,
    pub release_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
}

impl ShowDraft {
    pub fn from_row(upstream_id: i64, row: &UpstreamRow) -> Self {
        Self {
            upstream_id,
            title: row.title.clone(),
            description: row.description.clone(),
            genre: row.genre.clone(),
            language: row.language.clone(),
            duration_minutes: row.duration_minutes.unwrap_or_default(),
            release_date: row.release_date,
            poster_url: row.poster_url.clone(),
        }
    }

    pub fn into_replica(self, id: i64) -> Show {
        Show {
            id,
            upstream_id: self.upstream_id,
            title: self.title,
            description: self.description,
            genre: self.genre,
            language: self.language,
            duration_minutes: self.duration_minutes,
            release_date: self.release_date,
            poster_url: self.poster_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowtimeDraft {
    pub upstream_id: i64,
    pub show_upstream_id: i64,
    pub venue_upstream_id: i64,
    pub show_date_time: Option<NaiveDateTime>,
    pub price_per_seat: Option<f64>,
    pub total_seats: i32,
}

impl ShowtimeDraft {
    pub fn into_replica(self, id: i64, show_id: i64, venue_id: i64) -> Showtime {
        Showtime {
            id,
            upstream_id: self.upstream_id,
            show_id,
            venue_id,
            show_date_time: self.show_date_time,
            price_per_seat: self.price_per_seat,
            total_seats: self.total_seats,
        }
    }
}
