//! In-memory budget API used by the orchestration tests
//!
//! Mirrors the server's behavior closely enough for the client's purposes:
//! token check, per-user records, denormalized category fields and the
//! income/expense summary. Any operation can be made to fail on demand.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, Notify};

use crate::client::{ApiError, ApiResult, BudgetApi};
use crate::models::{
    AuthResponse, Budget, Category, CategoryType, LoginRequest, NewBudget, NewCategory,
    NewTransaction, RecordId, RegisterRequest, Summary, Transaction, TransactionQuery, User,
};
use crate::session::SharedSession;

pub(crate) const PASSWORD: &str = "correct horse";
pub(crate) const TOKEN: &str = "tok-ada";

pub(crate) fn test_user() -> User {
    User {
        id: 1,
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

#[derive(Default)]
struct ServerData {
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    next_id: RecordId,
}

impl ServerData {
    fn next_id(&mut self) -> RecordId {
        self.next_id += 1;
        self.next_id
    }

    /// Transactions passing the query, as the server filters them
    fn matching<'a>(
        &'a self,
        query: &'a TransactionQuery,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |t| query.category.map_or(true, |c| t.category_id == Some(c)))
            .filter(move |t| match (query.start_date, query.end_date) {
                (Some(start), Some(end)) => t.date >= start && t.date <= end,
                _ => true,
            })
    }

    fn summary(&self, query: &TransactionQuery) -> Summary {
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        for txn in self.matching(query) {
            match txn.category_type {
                Some(CategoryType::Income) => income += txn.amount,
                Some(CategoryType::Expense) => expenses += txn.amount,
                None => {}
            }
        }
        Summary {
            income,
            expenses,
            balance: income - expenses,
        }
    }

    fn category(&self, id: RecordId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn recount(&mut self) {
        for category in &mut self.categories {
            category.transaction_count = self
                .transactions
                .iter()
                .filter(|t| t.category_id == Some(category.id))
                .count() as u64;
        }
    }
}

/// Fake budget API
pub(crate) struct FakeBudgetApi {
    session: SharedSession,
    data: Mutex<ServerData>,
    failing: std::sync::Mutex<HashSet<&'static str>>,
    calls: AtomicUsize,
    summary_gate: Mutex<Option<oneshot::Receiver<()>>>,
    summary_waiting: Notify,
}

impl FakeBudgetApi {
    /// The fake reads the same session cell a real client would
    pub(crate) fn new(session: SharedSession) -> Arc<Self> {
        Arc::new(Self {
            session,
            data: Mutex::new(ServerData::default()),
            failing: std::sync::Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
            summary_gate: Mutex::new(None),
            summary_waiting: Notify::new(),
        })
    }

    /// Make the named operation (e.g. "summary", "logout") fail
    pub(crate) fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub(crate) fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Hold the next summary response until the returned sender fires
    pub(crate) async fn hold_next_summary(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.summary_gate.lock().await = Some(rx);
        tx
    }

    /// Resolves once a held summary request has been received
    pub(crate) async fn summary_held(&self) {
        self.summary_waiting.notified().await;
    }

    pub(crate) async fn seed_category(&self, name: &str, category_type: CategoryType) -> Category {
        let mut data = self.data.lock().await;
        let category = Category {
            id: data.next_id(),
            name: name.to_string(),
            category_type,
            color: "#3B82F6".to_string(),
            description: None,
            created_at: None,
            transaction_count: 0,
        };
        data.categories.push(category.clone());
        category
    }

    fn check(&self, op: &'static str) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("{} failed", op),
            });
        }
        Ok(())
    }

    async fn require_token(&self) -> ApiResult<()> {
        match self.session.read().await.as_ref() {
            Some(s) if s.token == TOKEN => Ok(()),
            _ => Err(ApiError::Unauthorized {
                message: "Authentication credentials were not provided.".to_string(),
            }),
        }
    }

    async fn authorized(&self, op: &'static str) -> ApiResult<()> {
        self.check(op)?;
        self.require_token().await
    }

    fn build_transaction(
        data: &ServerData,
        id: RecordId,
        txn: &NewTransaction,
    ) -> ApiResult<Transaction> {
        let category = data.category(txn.category_id).ok_or_else(|| ApiError::Status {
            status: 400,
            message: "category: Invalid pk".to_string(),
        })?;
        Ok(Transaction {
            id,
            category_id: Some(category.id),
            category_name: Some(category.name.clone()),
            category_type: Some(category.category_type),
            amount: txn.amount,
            description: txn.description.clone(),
            date: txn.date,
            created_at: None,
        })
    }
}

#[async_trait]
impl BudgetApi for FakeBudgetApi {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.check("register")?;
        if request.password != request.password2 {
            return Err(ApiError::Status {
                status: 400,
                message: "password: Password fields didn't match.".to_string(),
            });
        }
        let mut user = test_user();
        user.username = request.username.clone();
        user.email = request.email.clone();
        Ok(AuthResponse {
            user,
            token: TOKEN.to_string(),
            message: Some("User registered successfully".to_string()),
        })
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.check("login")?;
        if request.username == "ada" && request.password == PASSWORD {
            Ok(AuthResponse {
                user: test_user(),
                token: TOKEN.to_string(),
                message: Some("Login successful".to_string()),
            })
        } else {
            Err(ApiError::Unauthorized {
                message: "Invalid credentials".to_string(),
            })
        }
    }

    async fn logout(&self) -> ApiResult<()> {
        self.authorized("logout").await
    }

    async fn profile(&self) -> ApiResult<User> {
        self.authorized("profile").await?;
        let mut user = test_user();
        user.email = "ada@analytical.engine".to_string();
        Ok(user)
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.authorized("categories").await?;
        Ok(self.data.lock().await.categories.clone())
    }

    async fn create_category(&self, category: &NewCategory) -> ApiResult<Category> {
        self.authorized("create_category").await?;
        let mut data = self.data.lock().await;
        let created = Category {
            id: data.next_id(),
            name: category.name.clone(),
            category_type: category.category_type,
            color: category.color.clone(),
            description: category.description.clone(),
            created_at: None,
            transaction_count: 0,
        };
        data.categories.push(created.clone());
        Ok(created)
    }

    async fn update_category(&self, id: RecordId, category: &NewCategory) -> ApiResult<Category> {
        self.authorized("update_category").await?;
        let mut data = self.data.lock().await;
        let existing = data
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/categories/{}/", id)))?;
        existing.name = category.name.clone();
        existing.category_type = category.category_type;
        existing.color = category.color.clone();
        existing.description = category.description.clone();
        let updated = existing.clone();
        for txn in data.transactions.iter_mut() {
            if txn.category_id == Some(id) {
                txn.category_name = Some(updated.name.clone());
                txn.category_type = Some(updated.category_type);
            }
        }
        Ok(updated)
    }

    async fn delete_category(&self, id: RecordId) -> ApiResult<()> {
        self.authorized("delete_category").await?;
        let mut data = self.data.lock().await;
        let before = data.categories.len();
        data.categories.retain(|c| c.id != id);
        if data.categories.len() == before {
            return Err(ApiError::NotFound(format!("/categories/{}/", id)));
        }
        for txn in data.transactions.iter_mut() {
            if txn.category_id == Some(id) {
                txn.category_id = None;
                txn.category_name = None;
                txn.category_type = None;
            }
        }
        Ok(())
    }

    async fn list_transactions(&self, query: &TransactionQuery) -> ApiResult<Vec<Transaction>> {
        self.authorized("transactions").await?;
        let data = self.data.lock().await;
        Ok(data.matching(query).cloned().collect())
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> ApiResult<Transaction> {
        self.authorized("create_transaction").await?;
        let mut data = self.data.lock().await;
        let id = data.next_id();
        let created = Self::build_transaction(&data, id, transaction)?;
        data.transactions.insert(0, created.clone());
        data.recount();
        Ok(created)
    }

    async fn update_transaction(
        &self,
        id: RecordId,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction> {
        self.authorized("update_transaction").await?;
        let mut data = self.data.lock().await;
        let updated = Self::build_transaction(&data, id, transaction)?;
        let slot = data
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/transactions/{}/", id)))?;
        *slot = updated.clone();
        data.recount();
        Ok(updated)
    }

    async fn delete_transaction(&self, id: RecordId) -> ApiResult<()> {
        self.authorized("delete_transaction").await?;
        let mut data = self.data.lock().await;
        let before = data.transactions.len();
        data.transactions.retain(|t| t.id != id);
        if data.transactions.len() == before {
            return Err(ApiError::NotFound(format!("/transactions/{}/", id)));
        }
        data.recount();
        Ok(())
    }

    async fn summary(&self, query: &TransactionQuery) -> ApiResult<Summary> {
        self.authorized("summary").await?;
        let summary = self.data.lock().await.summary(query);

        let gate = self.summary_gate.lock().await.take();
        if let Some(gate) = gate {
            self.summary_waiting.notify_one();
            let _ = gate.await;
        }
        Ok(summary)
    }

    async fn list_budgets(&self) -> ApiResult<Vec<Budget>> {
        self.authorized("budgets").await?;
        Ok(self.data.lock().await.budgets.clone())
    }

    async fn create_budget(&self, budget: &NewBudget) -> ApiResult<Budget> {
        self.authorized("create_budget").await?;
        let mut data = self.data.lock().await;
        let category_name = data.category(budget.category_id).map(|c| c.name.clone());
        let created = Budget {
            id: data.next_id(),
            category_id: budget.category_id,
            category_name,
            amount: budget.amount,
            spent: Decimal::ZERO,
            remaining: budget.amount,
            period: budget.period,
            start_date: budget.start_date,
            end_date: budget.end_date,
        };
        data.budgets.push(created.clone());
        Ok(created)
    }

    async fn update_budget(&self, id: RecordId, budget: &NewBudget) -> ApiResult<Budget> {
        self.authorized("update_budget").await?;
        let mut data = self.data.lock().await;
        let slot = data
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/budgets/{}/", id)))?;
        slot.amount = budget.amount;
        slot.period = budget.period;
        slot.start_date = budget.start_date;
        slot.end_date = budget.end_date;
        slot.remaining = budget.amount - slot.spent;
        Ok(slot.clone())
    }

    async fn delete_budget(&self, id: RecordId) -> ApiResult<()> {
        self.authorized("delete_budget").await?;
        let mut data = self.data.lock().await;
        let before = data.budgets.len();
        data.budgets.retain(|b| b.id != id);
        if data.budgets.len() == before {
            return Err(ApiError::NotFound(format!("/budgets/{}/", id)));
        }
        Ok(())
    }
}
