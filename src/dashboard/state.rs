//! View state held by the dashboard coordinator

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::models::{Category, RecordId, Summary, Transaction};

/// The three resources fetched by a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Summary,
    Categories,
    Transactions,
}

impl Resource {
    pub const ALL: [Resource; 3] = [
        Resource::Summary,
        Resource::Categories,
        Resource::Transactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Summary => "summary",
            Resource::Categories => "categories",
            Resource::Transactions => "transactions",
        }
    }

    fn index(&self) -> usize {
        match self {
            Resource::Summary => 0,
            Resource::Categories => 1,
            Resource::Transactions => 2,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of the dashboard view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    #[default]
    Unauthenticated,
    /// At least one refresh is in flight
    Loading,
    Ready,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub phase: ViewPhase,
    pub summary: Summary,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    /// Last failure per resource, cleared when that resource next loads
    pub errors: BTreeMap<Resource, String>,
    /// When a refresh last completed with every fetch succeeding
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl DashboardView {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn category_name(&self, id: RecordId) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}

/// How a refresh ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settled {
    /// Every fetch succeeded
    Complete,
    /// At least one fetch failed
    Partial,
    /// Every fetch was refused for lack of a valid session
    Rejected,
}

/// View plus the bookkeeping needed to order overlapping refreshes
#[derive(Debug, Default)]
pub(crate) struct ViewState {
    pub view: DashboardView,
    /// Newest generation that settled each resource, success or failure
    applied: [u64; 3],
    /// Refreshes started and not yet settled
    in_flight: BTreeSet<u64>,
    /// Refreshes at or below this generation started before the last reset
    reset_floor: u64,
}

impl ViewState {
    pub fn begin(&mut self, generation: u64) {
        if generation <= self.reset_floor {
            return;
        }
        self.in_flight.insert(generation);
        self.view.phase = ViewPhase::Loading;
    }

    /// Record that a refresh settled.
    ///
    /// Once none remain in flight the view is `Ready`, or back to
    /// `Unauthenticated` if the last one was refused outright.
    pub fn finish(&mut self, generation: u64, settled: Settled) {
        if !self.in_flight.remove(&generation) || generation <= self.reset_floor {
            return;
        }
        if settled == Settled::Complete {
            self.view.last_refreshed = Some(Utc::now());
        }
        if self.in_flight.is_empty() {
            self.view.phase = match settled {
                Settled::Rejected => ViewPhase::Unauthenticated,
                Settled::Complete | Settled::Partial => ViewPhase::Ready,
            };
        }
    }

    /// Whether a result from `generation` may overwrite `resource`
    pub fn accepts(&self, resource: Resource, generation: u64) -> bool {
        generation > self.reset_floor && generation > self.applied[resource.index()]
    }

    pub fn mark_applied(&mut self, resource: Resource, generation: u64) {
        self.applied[resource.index()] = generation;
        self.view.errors.remove(&resource);
    }

    /// A failure also claims the resource, so older results landing later
    /// cannot hide it.
    pub fn record_error(&mut self, resource: Resource, generation: u64, message: String) {
        self.applied[resource.index()] = generation;
        self.view.errors.insert(resource, message);
    }

    /// Drop all cached data and ignore refreshes started up to `generation`
    pub fn reset(&mut self, generation: u64) {
        self.view = DashboardView::default();
        self.applied = [generation; 3];
        self.in_flight.clear();
        self.reset_floor = generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phase_is_unauthenticated() {
        let state = ViewState::default();
        assert_eq!(state.view.phase, ViewPhase::Unauthenticated);
    }

    #[test]
    fn test_loading_until_last_refresh_settles() {
        let mut state = ViewState::default();
        state.begin(1);
        state.begin(2);
        assert_eq!(state.view.phase, ViewPhase::Loading);

        state.finish(1, Settled::Complete);
        assert_eq!(state.view.phase, ViewPhase::Loading);

        state.finish(2, Settled::Partial);
        assert_eq!(state.view.phase, ViewPhase::Ready);
    }

    #[test]
    fn test_older_generation_rejected() {
        let mut state = ViewState::default();
        assert!(state.accepts(Resource::Summary, 1));

        state.mark_applied(Resource::Summary, 3);
        assert!(!state.accepts(Resource::Summary, 2));
        assert!(state.accepts(Resource::Summary, 4));
        assert!(state.accepts(Resource::Categories, 2));
    }

    #[test]
    fn test_reset_ignores_earlier_refreshes() {
        let mut state = ViewState::default();
        state.begin(1);
        state.record_error(Resource::Transactions, 1, "boom".to_string());

        state.reset(1);
        assert_eq!(state.view.phase, ViewPhase::Unauthenticated);
        assert!(!state.view.has_errors());
        assert!(!state.accepts(Resource::Transactions, 1));

        state.finish(1, Settled::Complete);
        assert_eq!(state.view.phase, ViewPhase::Unauthenticated);
        assert!(state.view.last_refreshed.is_none());
    }

    #[test]
    fn test_applied_clears_error() {
        let mut state = ViewState::default();
        state.record_error(Resource::Categories, 1, "down".to_string());
        assert!(state.view.has_errors());

        state.mark_applied(Resource::Categories, 2);
        assert!(!state.view.has_errors());
    }

    #[test]
    fn test_failure_blocks_older_results() {
        let mut state = ViewState::default();
        state.record_error(Resource::Summary, 2, "down".to_string());

        assert!(!state.accepts(Resource::Summary, 1));
        assert!(state.accepts(Resource::Summary, 3));
        assert!(state.accepts(Resource::Transactions, 1));
    }

    #[test]
    fn test_rejected_refresh_stays_unauthenticated() {
        let mut state = ViewState::default();
        state.begin(1);
        assert_eq!(state.view.phase, ViewPhase::Loading);

        state.finish(1, Settled::Rejected);
        assert_eq!(state.view.phase, ViewPhase::Unauthenticated);
        assert!(state.view.last_refreshed.is_none());
    }
}
