//! # Budget Client
//!
//! Client side of a personal budgeting service: authenticates a user, keeps
//! the session across restarts, and keeps a dashboard of summary totals,
//! categories and transactions in sync with the server.
//!
//! ## Modules
//!
//! - [`session`]: login/register/logout and the persisted session record
//! - [`client`]: the budget REST API, with the token attached to each request
//! - [`dashboard`]: concurrent refresh and fire-and-confirm mutations
//! - [`forms`]: raw input validation for new records
//! - [`render`]: terminal rendering of the dashboard
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use budget_client::{BudgetClient, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BudgetClient::from_config(&Config::load_default())?;
//!
//!     // Restore a saved session, or log in
//!     let (user, _) = client.start().await;
//!     if user.is_none() {
//!         client.login("ada", "correct horse").await?;
//!     }
//!
//!     // Refresh summary, categories and transactions together
//!     client.dashboard().refresh_all().await?;
//!
//!     let view = client.view().await;
//!     println!("Balance: {}", view.summary.balance);
//!
//!     client.logout().await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod forms;
pub mod models;
pub mod render;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use app::BudgetClient;

pub use client::{ApiClientConfig, ApiError, ApiResult, BudgetApi, HttpBudgetApi};

pub use config::{Config, ConfigError, LoggingConfig};

pub use dashboard::{
    DashboardCoordinator, DashboardError, DashboardResult, DashboardView, RefreshFailure,
    Resource, ViewPhase,
};

pub use forms::{BudgetForm, CategoryForm, Form, FormError, FormState, TransactionForm};

pub use models::{
    Budget, BudgetPeriod, Category, CategoryType, NewBudget, NewCategory, NewTransaction,
    RecordId, RegisterRequest, Session, Summary, Transaction, TransactionQuery, User,
};

pub use session::{
    FileSessionStore, MemorySessionStore, SessionError, SessionManager, SessionResult,
    SessionStore, SharedSession,
};
