//! Dashboard Data Coordination
//!
//! Keeps the dashboard's view of summary, categories and transactions in
//! sync with the server.
//!
//! ## Refresh
//!
//! `refresh_all` fetches the three resources concurrently and applies each
//! result as soon as it arrives. One failing fetch does not undo the others.
//! Every refresh carries a generation number; a result older than the one
//! already shown for a resource is dropped, so overlapping refreshes cannot
//! roll the view back.
//!
//! ## Mutations
//!
//! Creates, updates and deletes wait for the server to confirm, then refresh
//! everything. Nothing is predicted locally.

mod coordinator;
mod state;

pub use coordinator::DashboardCoordinator;
pub use state::{DashboardView, Resource, ViewPhase};

use thiserror::Error;

use crate::client::ApiError;

/// A single sub-fetch that failed during a refresh
#[derive(Debug)]
pub struct RefreshFailure {
    pub resource: Resource,
    pub error: ApiError,
}

/// Errors reported by the dashboard coordinator
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A create/update/delete was rejected or never reached the server
    #[error(transparent)]
    Api(#[from] ApiError),

    /// At least one of the refresh fetches failed
    #[error("Refresh failed: {}", describe_failures(.failures))]
    Refresh { failures: Vec<RefreshFailure> },
}

impl DashboardError {
    /// Whether any underlying API error was an authorization rejection
    pub fn is_unauthorized(&self) -> bool {
        match self {
            DashboardError::Api(e) => e.is_unauthorized(),
            DashboardError::Refresh { failures } => {
                failures.iter().any(|f| f.error.is_unauthorized())
            }
        }
    }
}

fn describe_failures(failures: &[RefreshFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.resource, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;
