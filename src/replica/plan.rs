//! Reconciliation plan: what the replica must contain after a cycle.
//!
//! Built purely from a fetched snapshot, before storage is touched:
//! - one venue per distinct venue upstream id (first occurrence wins)
//! - one show per distinct show upstream id (first occurrence wins)
//! - one showtime per row that names a show, a venue and a showtime id;
//!   rows missing any of the three are skipped with a warning
//!
//! Every showtime in a plan references a venue and a show in the same plan.

use std::collections::HashSet;

use tracing::warn;

use crate::replica::model::{ShowDraft, ShowtimeDraft, UpstreamRow, VenueDraft};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPlan {
    pub venues: Vec<VenueDraft>,
    pub shows: Vec<ShowDraft>,
    pub showtimes: Vec<ShowtimeDraft>,
    /// rows dropped for a missing show, venue or showtime id
    pub skipped_rows: usize,
    /// rows dropped because their showtime id was already planned
    pub duplicate_showtimes: usize,
}

impl CatalogPlan {
    pub fn from_rows(rows: &[UpstreamRow]) -> Self {
        let mut plan = CatalogPlan::default();

        let mut seen_venues = HashSet::new();
        for row in rows {
            if let Some(venue_id) = row.venue_id {
                if seen_venues.insert(venue_id) {
                    plan.venues.push(VenueDraft::from_row(venue_id, row));
                }
            }
        }

        let mut seen_shows = HashSet::new();
        for row in rows {
            if let Some(show_id) = row.show_id {
                if seen_shows.insert(show_id) {
                    plan.shows.push(ShowDraft::from_row(show_id, row));
                }
            }
        }

        let mut seen_showtimes = HashSet::new();
        for row in rows {
            let (Some(show_id), Some(venue_id), Some(showtime_id)) =
                (row.show_id, row.venue_id, row.showtime_id)
            else {
                warn!(
                    show_id = ?row.show_id,
                    venue_id = ?row.venue_id,
                    showtime_id = ?row.showtime_id,
                    "skipping upstream row with missing upstream id(s)"
                );
                plan.skipped_rows += 1;
                continue;
            };

            if !seen_showtimes.insert(showtime_id) {
                warn!(showtime_id, "skipping duplicate upstream showtime id");
                plan.duplicate_showtimes += 1;
                continue;
            }

            plan.showtimes.push(ShowtimeDraft {
                upstream_id: showtime_id,
                show_upstream_id: show_id,
                venue_upstream_id: venue_id,
                show_date_time: row.show_date_time,
                price_per_seat: row.price_per_seat,
                total_seats: row.total_seats.unwrap_or_default(),
            });
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty() && self.shows.is_empty() && self.showtimes.is_empty()
    }
}
