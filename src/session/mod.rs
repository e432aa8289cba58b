//! Session Management
//!
//! Owns the authenticated identity and its credential token.
//!
//! - [`SessionManager`]: login, register, logout, startup restore
//! - [`SessionStore`]: durable storage for the session record
//! - [`SharedSession`]: the in-memory cell the API client reads tokens from
//!
//! The token and user are persisted as one record, so a crash between two
//! writes can never leave a token without its user.

mod manager;
mod store;

pub use manager::SessionManager;
pub use store::{FileSessionStore, MemorySessionStore, PersistedSession, SessionStore};

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::client::ApiError;
use crate::models::Session;

/// In-memory session shared between the session manager and the API client
pub type SharedSession = Arc<RwLock<Option<Session>>>;

/// Create an empty shared session cell
pub fn shared_session() -> SharedSession {
    Arc::new(RwLock::new(None))
}

/// Errors that can occur in the session layer
#[derive(Error, Debug)]
pub enum SessionError {
    /// The auth endpoint rejected the request or could not be reached
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing the session record failed
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted record could not be encoded or decoded
    #[error("Session record error: {0}")]
    Serialization(String),

    /// Operation requires a logged-in user
    #[error("Not logged in")]
    NotAuthenticated,
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
