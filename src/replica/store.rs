use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::replica::model::{Show, Showtime, Venue};
use crate::replica::plan::CatalogPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicaKind {
    Show,
    Venue,
    Showtime,
}

impl ReplicaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaKind::Show => "show",
            ReplicaKind::Venue => "venue",
            ReplicaKind::Showtime => "showtime",
        }
    }
}

impl fmt::Display for ReplicaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("showtime {showtime_upstream_id} references missing {kind} {upstream_id}")]
    DanglingReference {
        showtime_upstream_id: i64,
        kind: ReplicaKind,
        upstream_id: i64,
    },
    #[error("duplicate {kind} upstream id {upstream_id}")]
    DuplicateUpstreamId { kind: ReplicaKind, upstream_id: i64 },
    #[error("replica store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplicaCounts {
    pub shows: usize,
    pub venues: usize,
    pub showtimes: usize,
}

/// One complete, immutable replica built from a single reconciliation.
///
/// Readers hold an `Arc` to a whole generation, so they always see a
/// consistent catalog even while the next one is being built.
#[derive(Debug, Default)]
pub struct ReplicaGeneration {
    venues: BTreeMap<i64, Venue>,
    shows: BTreeMap<i64, Show>,
    showtimes: BTreeMap<i64, Showtime>,
    venue_ids_by_upstream: HashMap<i64, i64>,
    show_ids_by_upstream: HashMap<i64, i64>,
    showtime_ids_by_upstream: HashMap<i64, i64>,
}

impl ReplicaGeneration {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Materialize a plan, drawing local ids from `next_id`.
    ///
    /// Venues are inserted first, then shows, then showtimes resolved to the
    /// local ids of their parents. Fails without side effects if the plan
    /// would break upstream-id uniqueness or leave a dangling showtime.
    pub fn build(plan: &CatalogPlan, mut next_id: impl FnMut() -> i64) -> Result<Self, StoreError> {
        let mut generation = Self::empty();

        for draft in &plan.venues {
            let id = next_id();
            if generation
                .venue_ids_by_upstream
                .insert(draft.upstream_id, id)
                .is_some()
            {
                return Err(StoreError::DuplicateUpstreamId {
                    kind: ReplicaKind::Venue,
                    upstream_id: draft.upstream_id,
                });
            }
            generation.venues.insert(id, draft.clone().into_replica(id));
        }

        for draft in &plan.shows {
            let id = next_id();
            if generation
                .show_ids_by_upstream
                .insert(draft.upstream_id, id)
                .is_some()
            {
                return Err(StoreError::DuplicateUpstreamId {
                    kind: ReplicaKind::Show,
                    upstream_id: draft.upstream_id,
                });
            }
            generation.shows.insert(id, draft.clone().into_replica(id));
        }

        for draft in &plan.showtimes {
            let show_id = *generation
                .show_ids_by_upstream
                .get(&draft.show_upstream_id)
                .ok_or(StoreError::DanglingReference {
                    showtime_upstream_id: draft.upstream_id,
                    kind: ReplicaKind::Show,
                    upstream_id: draft.show_upstream_id,
                })?;
            let venue_id = *generation
                .venue_ids_by_upstream
                .get(&draft.venue_upstream_id)
                .ok_or(StoreError::DanglingReference {
                    showtime_upstream_id: draft.upstream_id,
                    kind: ReplicaKind::Venue,
                    upstream_id: draft.venue_upstream_id,
                })?;

            let id = next_id();
            if generation
                .showtime_ids_by_upstream
                .insert(draft.upstream_id, id)
                .is_some()
            {
                return Err(StoreError::DuplicateUpstreamId {
                    kind: ReplicaKind::Showtime,
                    upstream_id: draft.upstream_id,
                });
            }
            generation
                .showtimes
                .insert(id, draft.clone().into_replica(id, show_id, venue_id));
        }

        Ok(generation)
    }

    pub fn counts(&self) -> ReplicaCounts {
        ReplicaCounts {
            shows: self.shows.len(),
            venues: self.venues.len(),
            showtimes: self.showtimes.len(),
        }
    }

    pub fn shows(&self) -> impl Iterator<Item = &Show> {
        self.shows.values()
    }

    pub fn showtimes(&self) -> impl Iterator<Item = &Showtime> {
        self.showtimes.values()
    }

    pub fn show(&self, id: i64) -> Option<&Show> {
        self.shows.get(&id)
    }

    pub fn venue(&self, id: i64) -> Option<&Venue> {
        self.venues.get(&id)
    }

    pub fn showtime(&self, id: i64) -> Option<&Showtime> {
        self.showtimes.get(&id)
    }

    pub fn show_by_upstream_id(&self, upstream_id: i64) -> Option<&Show> {
        self.show_ids_by_upstream
            .get(&upstream_id)
            .and_then(|id| self.shows.get(id))
    }

    pub fn venue_by_upstream_id(&self, upstream_id: i64) -> Option<&Venue> {
        self.venue_ids_by_upstream
            .get(&upstream_id)
            .and_then(|id| self.venues.get(id))
    }

    pub fn showtime_by_upstream_id(&self, upstream_id: i64) -> Option<&Showtime> {
        self.showtime_ids_by_upstream
            .get(&upstream_id)
            .and_then(|id| self.showtimes.get(id))
    }

    pub fn showtimes_for_show(&self, show_id: i64) -> Vec<&Showtime> {
        self.showtimes
            .values()
            .filter(|showtime| showtime.show_id == show_id)
            .collect()
    }

    pub fn search_by_title(&self, keyword: &str) -> Vec<&Show> {
        let keyword = keyword.to_lowercase();
        self.shows
            .values()
            .filter(|show| {
                show.title
                    .as_deref()
                    .is_some_and(|title| title.to_lowercase().contains(&keyword))
            })
            .collect()
    }

    pub fn shows_by_genre(&self, genre: &str) -> Vec<&Show> {
        self.shows
            .values()
            .filter(|show| show.genre.as_deref() == Some(genre))
            .collect()
    }
}

/// Local replica storage, written only by the replication engine.
pub trait ReplicaStore: Send + Sync {
    /// Replace the whole replica with the plan's contents.
    ///
    /// On error the previous contents stay in place.
    fn replace_all(
        &self,
        plan: &CatalogPlan,
    ) -> impl Future<Output = Result<ReplicaCounts, StoreError>> + Send;

    /// Remove every showtime, then every show, then every venue.
    fn clear_all(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The generation readers should serve from.
    fn current(&self) -> impl Future<Output = Arc<ReplicaGeneration>> + Send;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::replica::model::{ShowDraft, ShowtimeDraft, VenueDraft};

    fn venue(upstream_id: i64) -> VenueDraft {
        VenueDraft {
            upstream_id,
            name: Some("V".into()),
            address: None,
            city: None,
            capacity: 100,
        }
    }

    fn show(upstream_id: i64, title: &str, genre: &str) -> ShowDraft {
        ShowDraft {
            upstream_id,
            title: Some(title.into()),
            description: None,
            genre: Some(genre.into()),
            language: None,
            duration_minutes: 120,
            release_date: None,
            poster_url: None,
        }
    }

    fn showtime(upstream_id: i64, show: i64, venue: i64) -> ShowtimeDraft {
        ShowtimeDraft {
            upstream_id,
            show_upstream_id: show,
            venue_upstream_id: venue,
            show_date_time: None,
            price_per_seat: Some(10.0),
            total_seats: 50,
        }
    }

    fn sequence() -> impl FnMut() -> i64 {
        let mut next = 0;
        move || {
            next += 1;
            next
        }
    }

    #[test]
    fn build_resolves_showtimes_to_local_parents() {
        let plan = CatalogPlan {
            venues: vec![venue(9)],
            shows: vec![show(1, "X", "Drama")],
            showtimes: vec![showtime(100, 1, 9)],
            ..Default::default()
        };

        let generation = ReplicaGeneration::build(&plan, sequence()).unwrap();
        let st = generation.showtime_by_upstream_id(100).unwrap();
        assert_eq!(generation.show(st.show_id).unwrap().upstream_id, 1);
        assert_eq!(generation.venue(st.venue_id).unwrap().upstream_id, 9);
        assert_eq!(
            generation.counts(),
            ReplicaCounts { shows: 1, venues: 1, showtimes: 1 }
        );
    }

    #[test]
    fn build_rejects_dangling_showtime() {
        let plan = CatalogPlan {
            venues: vec![venue(9)],
            shows: vec![],
            showtimes: vec![showtime(100, 1, 9)],
            ..Default::default()
        };

        let err = ReplicaGeneration::build(&plan, sequence()).unwrap_err();
        assert_eq!(
            err,
            StoreError::DanglingReference {
                showtime_upstream_id: 100,
                kind: ReplicaKind::Show,
                upstream_id: 1
            }
        );
    }

    #[test]
    fn build_rejects_duplicate_upstream_ids() {
        let plan = CatalogPlan {
            venues: vec![venue(9), venue(9)],
            ..Default::default()
        };

        assert!(matches!(
            ReplicaGeneration::build(&plan, sequence()),
            Err(StoreError::DuplicateUpstreamId { kind: ReplicaKind::Venue, upstream_id: 9 })
        ));
    }

    #[test]
    fn queries_filter_by_title_and_genre() {
        let plan = CatalogPlan {
            venues: vec![venue(9)],
            shows: vec![show(1, "The Night Shift", "Drama"), show(2, "Daylight", "Comedy")],
            showtimes: vec![showtime(100, 1, 9), showtime(101, 1, 9), showtime(102, 2, 9)],
            ..Default::default()
        };
        let generation = ReplicaGeneration::build(&plan, sequence()).unwrap();

        let found: Vec<i64> = generation.search_by_title("NIGHT").iter().map(|s| s.upstream_id).collect();
        assert_eq!(found, vec![1]);
        assert_eq!(generation.shows_by_genre("Comedy").len(), 1);
        assert!(generation.shows_by_genre("comedy").is_empty());

        let night = generation.show_by_upstream_id(1).unwrap();
        assert_eq!(generation.showtimes_for_show(night.id).len(), 2);
    }
}
