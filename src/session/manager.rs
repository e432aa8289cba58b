//! SessionManager - login state for the dashboard.

use std::sync::Arc;

use super::{SessionError, SessionResult, SessionStore, SharedSession};
use crate::client::BudgetApi;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Session, User};

/// Owns the authenticated identity and keeps the persisted record in step
/// with the in-memory session.
///
/// The in-memory cell is shared with the API client, which reads the token
/// from it on every request.
pub struct SessionManager {
    api: Arc<dyn BudgetApi>,
    store: Arc<dyn SessionStore>,
    session: SharedSession,
}

impl SessionManager {
    pub fn new(api: Arc<dyn BudgetApi>, store: Arc<dyn SessionStore>, session: SharedSession) -> Self {
        Self {
            api,
            store,
            session,
        }
    }

    /// Restore the persisted session, if any.
    ///
    /// No network call is made: a stored token is trusted until the server
    /// rejects it. A record missing its token or user, or one that cannot be
    /// read, is discarded and the session starts empty.
    pub async fn initialize(&self) -> Option<User> {
        let restored = match self.store.load().await {
            Ok(Some(record)) => {
                let session = record.into_session();
                if session.is_none() {
                    tracing::warn!("Discarding incomplete session record");
                    self.discard_record().await;
                }
                session
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session record, starting logged out");
                self.discard_record().await;
                None
            }
        };

        let user = restored.as_ref().map(|s| s.user.clone());
        if let Some(user) = &user {
            tracing::info!(username = %user.username, "Session restored");
        }
        *self.session.write().await = restored;
        user
    }

    /// Log in with username and password.
    ///
    /// Errors from the server are returned unchanged; nothing is retried.
    pub async fn login(&self, username: &str, password: &str) -> SessionResult<User> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await?;
        self.establish(response).await
    }

    /// Create an account and log straight into it.
    pub async fn register(&self, request: &RegisterRequest) -> SessionResult<User> {
        let response = self.api.register(request).await?;
        self.establish(response).await
    }

    /// Log out locally, telling the server best-effort.
    ///
    /// A failed remote logout is logged and ignored; the local session is
    /// cleared either way. Only a failure to remove the persisted record is
    /// reported.
    pub async fn logout(&self) -> SessionResult<()> {
        if self.session.read().await.is_some() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "Remote logout failed, clearing local session anyway");
            }
        }

        let previous = self.session.write().await.take();
        if let Some(previous) = previous {
            tracing::info!(username = %previous.user.username, "Logged out");
        }

        self.store.clear().await
    }

    /// Fetch the profile from the server and store it as the session user.
    pub async fn refresh_profile(&self) -> SessionResult<User> {
        let token = self
            .token()
            .await
            .ok_or(SessionError::NotAuthenticated)?;

        let user = self.api.profile().await?;
        let session = Session::new(user.clone(), token);
        self.store.save(&session).await?;
        *self.session.write().await = Some(session);
        Ok(user)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// The cell the API client reads tokens from
    pub fn shared(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// Persist first, then publish to memory, so memory never holds a
    /// session the next startup would not restore.
    async fn establish(&self, response: AuthResponse) -> SessionResult<User> {
        let session = Session::new(response.user, response.token);
        self.store.save(&session).await?;

        let user = session.user.clone();
        tracing::info!(username = %user.username, "Session established");
        *self.session.write().await = Some(session);
        Ok(user)
    }

    async fn discard_record(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "Failed to remove session record");
        }
    }
}
