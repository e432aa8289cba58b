//! Budget API Client
//!
//! Transport layer for the budget REST API.
//!
//! - [`BudgetApi`]: async trait covering every endpoint the dashboard uses
//! - [`HttpBudgetApi`]: `reqwest` implementation that attaches the current
//!   session token as `Authorization: Token <value>` to each request
//!
//! # Endpoints
//!
//! - `POST /auth/register/`, `POST /auth/login/`, `POST /auth/logout/`
//! - `GET /auth/profile/`
//! - `GET/POST /categories/`, `PUT/DELETE /categories/:id/`
//! - `GET/POST /transactions/`, `PUT/DELETE /transactions/:id/`
//! - `GET /transactions/summary/`
//! - `GET/POST /budgets/`, `PUT/DELETE /budgets/:id/`

mod error;
mod http;

pub use error::{ApiError, ApiResult};
pub use http::{ApiClientConfig, HttpBudgetApi, DEFAULT_BASE_URL};

use async_trait::async_trait;

use crate::models::{
    AuthResponse, Budget, Category, LoginRequest, NewBudget, NewCategory, NewTransaction,
    RecordId, RegisterRequest, Summary, Transaction, TransactionQuery, User,
};

/// Every operation the client performs against the budget API
///
/// Implementations decide how credentials are attached; callers never pass
/// tokens explicitly.
#[async_trait]
pub trait BudgetApi: Send + Sync {
    // Auth
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse>;
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;
    async fn logout(&self) -> ApiResult<()>;
    async fn profile(&self) -> ApiResult<User>;

    // Categories
    async fn list_categories(&self) -> ApiResult<Vec<Category>>;
    async fn create_category(&self, category: &NewCategory) -> ApiResult<Category>;
    async fn update_category(&self, id: RecordId, category: &NewCategory) -> ApiResult<Category>;
    async fn delete_category(&self, id: RecordId) -> ApiResult<()>;

    // Transactions
    async fn list_transactions(&self, query: &TransactionQuery) -> ApiResult<Vec<Transaction>>;
    async fn create_transaction(&self, transaction: &NewTransaction) -> ApiResult<Transaction>;
    async fn update_transaction(
        &self,
        id: RecordId,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction>;
    async fn delete_transaction(&self, id: RecordId) -> ApiResult<()>;
    async fn summary(&self, query: &TransactionQuery) -> ApiResult<Summary>;

    // Budgets
    async fn list_budgets(&self) -> ApiResult<Vec<Budget>>;
    async fn create_budget(&self, budget: &NewBudget) -> ApiResult<Budget>;
    async fn update_budget(&self, id: RecordId, budget: &NewBudget) -> ApiResult<Budget>;
    async fn delete_budget(&self, id: RecordId) -> ApiResult<()>;
}
