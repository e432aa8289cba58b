//! Client wiring
//!
//! Builds the session manager and dashboard coordinator around one shared
//! session cell and one API client, and sequences them: login refreshes the
//! dashboard, logout resets it.

use std::sync::Arc;

use crate::client::{ApiError, BudgetApi, HttpBudgetApi};
use crate::config::Config;
use crate::dashboard::{DashboardCoordinator, DashboardResult, DashboardView};
use crate::models::{RegisterRequest, User};
use crate::session::{
    shared_session, FileSessionStore, SessionManager, SessionResult, SessionStore,
    SharedSession,
};

/// Session manager and dashboard coordinator sharing one API client
pub struct BudgetClient {
    session: SessionManager,
    dashboard: Arc<DashboardCoordinator>,
}

impl BudgetClient {
    /// HTTP client plus a file-backed session, as configured
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let cell = shared_session();
        let api = Arc::new(HttpBudgetApi::new(
            config.api.client_config(),
            cell.clone(),
        )?);
        let store = Arc::new(FileSessionStore::new(config.session.path()));

        Ok(Self::with_parts(SessionManager::new(api.clone(), store, cell), api))
    }

    /// Assemble from an arbitrary API and store sharing `cell`
    pub fn new(
        api: Arc<dyn BudgetApi>,
        store: Arc<dyn SessionStore>,
        cell: SharedSession,
    ) -> Self {
        Self::with_parts(SessionManager::new(api.clone(), store, cell), api)
    }

    fn with_parts(session: SessionManager, api: Arc<dyn BudgetApi>) -> Self {
        Self {
            session,
            dashboard: Arc::new(DashboardCoordinator::new(api)),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn dashboard(&self) -> &Arc<DashboardCoordinator> {
        &self.dashboard
    }

    /// Restore the persisted session; load the dashboard if one was found.
    ///
    /// Session restore finishes before any fetch starts. A failed initial
    /// refresh is returned alongside the restored user.
    pub async fn start(&self) -> (Option<User>, DashboardResult<()>) {
        let user = self.session.initialize().await;
        let refreshed = match user {
            Some(_) => self.dashboard.refresh_all().await,
            None => Ok(()),
        };
        (user, refreshed)
    }

    pub async fn login(&self, username: &str, password: &str) -> SessionResult<User> {
        let user = self.session.login(username, password).await?;
        self.refresh_after_auth().await;
        Ok(user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> SessionResult<User> {
        let user = self.session.register(request).await?;
        self.refresh_after_auth().await;
        Ok(user)
    }

    /// Log out and clear the dashboard, regardless of the server's answer
    pub async fn logout(&self) -> SessionResult<()> {
        let result = self.session.logout().await;
        self.dashboard.reset().await;
        result
    }

    pub async fn view(&self) -> DashboardView {
        self.dashboard.snapshot().await
    }

    async fn refresh_after_auth(&self) {
        if let Err(e) = self.dashboard.refresh_all().await {
            tracing::warn!(error = %e, "Initial dashboard load failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ViewPhase;
    use crate::models::CategoryType;
    use crate::session::MemorySessionStore;
    use crate::testing::{test_user, FakeBudgetApi, PASSWORD};

    fn client() -> (BudgetClient, Arc<FakeBudgetApi>, Arc<MemorySessionStore>) {
        let cell = shared_session();
        let api = FakeBudgetApi::new(cell.clone());
        let store = Arc::new(MemorySessionStore::new());
        let client = BudgetClient::new(api.clone(), store.clone(), cell);
        (client, api, store)
    }

    #[tokio::test]
    async fn test_start_logged_out_makes_no_requests() {
        let (client, api, _store) = client();

        let (user, refreshed) = client.start().await;
        assert_eq!(user, None);
        assert!(refreshed.is_ok());
        assert_eq!(api.calls(), 0);
        assert_eq!(client.view().await.phase, ViewPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_loads_dashboard() {
        let (client, api, _store) = client();
        api.seed_category("Salary", CategoryType::Income).await;

        let user = client.login("ada", PASSWORD).await.unwrap();
        assert_eq!(user, test_user());

        let view = client.view().await;
        assert_eq!(view.phase, ViewPhase::Ready);
        assert_eq!(view.categories.len(), 1);
    }

    #[tokio::test]
    async fn test_restart_restores_and_refreshes() {
        let (client, api, store) = client();
        api.seed_category("Salary", CategoryType::Income).await;
        client.login("ada", PASSWORD).await.unwrap();

        let cell = shared_session();
        let api = FakeBudgetApi::new(cell.clone());
        let restarted = BudgetClient::new(api.clone(), store, cell);
        let (user, refreshed) = restarted.start().await;

        assert_eq!(user, Some(test_user()));
        assert!(refreshed.is_ok());
        assert_eq!(restarted.view().await.phase, ViewPhase::Ready);
    }

    #[tokio::test]
    async fn test_logout_resets_dashboard() {
        let (client, api, store) = client();
        api.seed_category("Salary", CategoryType::Income).await;
        client.login("ada", PASSWORD).await.unwrap();

        api.fail("logout");
        client.logout().await.unwrap();

        let view = client.view().await;
        assert_eq!(view.phase, ViewPhase::Unauthenticated);
        assert!(view.categories.is_empty());
        assert_eq!(store.record().await, None);
        assert!(!client.session().is_authenticated().await);
    }
}
