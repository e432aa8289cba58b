//! Dashboard coordinator: concurrent refresh and fire-and-confirm mutations

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::state::{DashboardView, Resource, Settled, ViewPhase, ViewState};
use super::{DashboardError, DashboardResult, RefreshFailure};
use crate::client::{ApiResult, BudgetApi};
use crate::models::{
    Budget, Category, NewBudget, NewCategory, NewTransaction, RecordId, Transaction,
    TransactionQuery,
};

/// Fetches and caches the dashboard's data
///
/// All requests go through the shared [`BudgetApi`], which attaches the
/// session token. Cheap to share behind an `Arc`; every method takes `&self`.
pub struct DashboardCoordinator {
    api: Arc<dyn BudgetApi>,
    state: RwLock<ViewState>,
    filter: RwLock<TransactionQuery>,
    generation: AtomicU64,
}

impl DashboardCoordinator {
    pub fn new(api: Arc<dyn BudgetApi>) -> Self {
        Self {
            api,
            state: RwLock::new(ViewState::default()),
            filter: RwLock::new(TransactionQuery::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Copy of the current view for rendering
    pub async fn snapshot(&self) -> DashboardView {
        self.state.read().await.view.clone()
    }

    pub async fn phase(&self) -> ViewPhase {
        self.state.read().await.view.phase
    }

    /// Filter applied to the transaction list and the summary
    ///
    /// Takes effect on the next refresh.
    pub async fn set_filter(&self, filter: TransactionQuery) {
        *self.filter.write().await = filter;
    }

    pub async fn filter(&self) -> TransactionQuery {
        self.filter.read().await.clone()
    }

    /// Fetch summary, categories and transactions concurrently.
    ///
    /// Each result is applied as soon as it arrives. Succeeds only if all
    /// three fetches succeed; on failure, the data from the fetches that did
    /// succeed stays applied and the failed resources keep their previous
    /// data.
    pub async fn refresh_all(&self) -> DashboardResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let filter = self.filter.read().await.clone();
        self.state.write().await.begin(generation);

        tracing::debug!(generation, "Refreshing dashboard");

        let (summary, categories, transactions) = tokio::join!(
            self.fetch_summary(generation, &filter),
            self.fetch_categories(generation),
            self.fetch_transactions(generation, &filter),
        );

        let failures: Vec<RefreshFailure> = [summary, categories, transactions]
            .into_iter()
            .filter_map(Result::err)
            .collect();

        let settled = if failures.is_empty() {
            Settled::Complete
        } else if failures.len() == Resource::ALL.len()
            && failures.iter().all(|f| f.error.is_unauthorized())
        {
            Settled::Rejected
        } else {
            Settled::Partial
        };
        self.state.write().await.finish(generation, settled);

        if failures.is_empty() {
            tracing::debug!(generation, "Dashboard refreshed");
            Ok(())
        } else {
            Err(DashboardError::Refresh { failures })
        }
    }

    /// Forget all cached data and return to the logged-out phase
    ///
    /// Refreshes still in flight are ignored when they land.
    pub async fn reset(&self) {
        let current = self.generation.load(Ordering::SeqCst);
        self.state.write().await.reset(current);
        *self.filter.write().await = TransactionQuery::default();
        tracing::debug!(generation = current, "Dashboard reset");
    }

    // ============= Categories =============

    pub async fn create_category(&self, category: &NewCategory) -> DashboardResult<Category> {
        let created = self.api.create_category(category).await?;
        tracing::info!(id = created.id, name = %created.name, "Category created");
        self.resync().await;
        Ok(created)
    }

    pub async fn update_category(
        &self,
        id: RecordId,
        category: &NewCategory,
    ) -> DashboardResult<Category> {
        let updated = self.api.update_category(id, category).await?;
        tracing::info!(id, "Category updated");
        self.resync().await;
        Ok(updated)
    }

    pub async fn delete_category(&self, id: RecordId) -> DashboardResult<()> {
        self.api.delete_category(id).await?;
        tracing::info!(id, "Category deleted");
        self.resync().await;
        Ok(())
    }

    // ============= Transactions =============

    pub async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> DashboardResult<Transaction> {
        let created = self.api.create_transaction(transaction).await?;
        tracing::info!(id = created.id, amount = %created.amount, "Transaction created");
        self.resync().await;
        Ok(created)
    }

    pub async fn update_transaction(
        &self,
        id: RecordId,
        transaction: &NewTransaction,
    ) -> DashboardResult<Transaction> {
        let updated = self.api.update_transaction(id, transaction).await?;
        tracing::info!(id, "Transaction updated");
        self.resync().await;
        Ok(updated)
    }

    pub async fn delete_transaction(&self, id: RecordId) -> DashboardResult<()> {
        self.api.delete_transaction(id).await?;
        tracing::info!(id, "Transaction deleted");
        self.resync().await;
        Ok(())
    }

    // ============= Budgets =============

    pub async fn list_budgets(&self) -> DashboardResult<Vec<Budget>> {
        Ok(self.api.list_budgets().await?)
    }

    pub async fn create_budget(&self, budget: &NewBudget) -> DashboardResult<Budget> {
        let created = self.api.create_budget(budget).await?;
        tracing::info!(id = created.id, "Budget created");
        Ok(created)
    }

    pub async fn update_budget(&self, id: RecordId, budget: &NewBudget) -> DashboardResult<Budget> {
        let updated = self.api.update_budget(id, budget).await?;
        tracing::info!(id, "Budget updated");
        Ok(updated)
    }

    pub async fn delete_budget(&self, id: RecordId) -> DashboardResult<()> {
        self.api.delete_budget(id).await?;
        tracing::info!(id, "Budget deleted");
        Ok(())
    }

    // ============= Internals =============

    /// Refresh after a confirmed mutation.
    ///
    /// The mutation already happened server-side, so a failed refresh is
    /// recorded in the view rather than returned.
    async fn resync(&self) {
        if let Err(e) = self.refresh_all().await {
            tracing::warn!(error = %e, "Refresh after mutation failed");
        }
    }

    async fn fetch_summary(
        &self,
        generation: u64,
        filter: &TransactionQuery,
    ) -> Result<(), RefreshFailure> {
        let result = self.api.summary(filter).await;
        self.apply(Resource::Summary, generation, result, |view, summary| {
            view.summary = summary
        })
        .await
    }

    async fn fetch_categories(&self, generation: u64) -> Result<(), RefreshFailure> {
        let result = self.api.list_categories().await;
        self.apply(Resource::Categories, generation, result, |view, categories| {
            view.categories = categories
        })
        .await
    }

    async fn fetch_transactions(
        &self,
        generation: u64,
        filter: &TransactionQuery,
    ) -> Result<(), RefreshFailure> {
        let result = self.api.list_transactions(filter).await;
        self.apply(Resource::Transactions, generation, result, |view, transactions| {
            view.transactions = transactions
        })
        .await
    }

    /// Write one fetch result into the view unless a newer one is shown
    async fn apply<T>(
        &self,
        resource: Resource,
        generation: u64,
        result: ApiResult<T>,
        set: impl FnOnce(&mut DashboardView, T),
    ) -> Result<(), RefreshFailure> {
        let mut state = self.state.write().await;
        match result {
            Ok(value) => {
                if state.accepts(resource, generation) {
                    set(&mut state.view, value);
                    state.mark_applied(resource, generation);
                } else {
                    tracing::debug!(%resource, generation, "Discarding stale result");
                }
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%resource, generation, error = %error, "Dashboard fetch failed");
                if state.accepts(resource, generation) {
                    state.record_error(resource, generation, error.to_string());
                }
                Err(RefreshFailure { resource, error })
            }
        }
    }
}
