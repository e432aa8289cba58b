//! Budget Data Model
//!
//! Records exchanged with the budget API:
//! - `User` and `Session`: who is logged in and with which token
//! - `Category`, `Transaction`, `Budget`: the user's resources
//! - `Summary`: server-computed income/expense totals
//!
//! Request bodies and list filters live in [`requests`].

mod requests;
mod types;

pub use requests::{
    AuthResponse, LoginRequest, NewBudget, NewCategory, NewTransaction, RegisterRequest,
    TransactionQuery,
};
pub use types::{
    Budget, BudgetPeriod, Category, CategoryType, Session, Summary, Transaction, User,
};

/// Identifier assigned by the server to every stored record
pub type RecordId = i64;
