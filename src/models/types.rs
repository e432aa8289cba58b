//! Core record types returned by the budget API
//!
//! Field names follow the server's JSON so the types deserialize directly
//! from responses. Derived fields (`transaction_count`, `category_name`,
//! `spent`, ...) are computed by the server and never recomputed here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordId;

/// Profile of the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: RecordId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    /// Name to greet the user with: full name when known, username otherwise
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// An authenticated identity plus the credential token that proves it
///
/// The two fields only ever exist together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }
}

/// Whether a category groups income or expenses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    #[default]
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            other => Err(format!("unknown category type: {}", other)),
        }
    }
}

/// A user-defined label for grouping transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Number of transactions filed under this category
    #[serde(default)]
    pub transaction_count: u64,
}

/// A single dated monetary movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: RecordId,
    /// Cleared by the server when the category is deleted
    #[serde(rename = "category")]
    pub category_id: Option<RecordId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_type: Option<CategoryType>,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Transaction {
    /// Amount with the sign implied by its category type
    ///
    /// Expenses come back negative; income and uncategorized amounts as-is.
    pub fn signed_amount(&self) -> Decimal {
        match self.category_type {
            Some(CategoryType::Expense) => -self.amount,
            _ => self.amount,
        }
    }
}

/// Server-computed totals over the (optionally filtered) transactions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

/// Length of a budget window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(format!("unknown budget period: {}", other)),
        }
    }
}

/// Spending limit for one category over a date window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: RecordId,
    #[serde(rename = "category")]
    pub category_id: RecordId,
    #[serde(default)]
    pub category_name: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub spent: Decimal,
    #[serde(default)]
    pub remaining: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Budget {
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_from_server_json() {
        let json = r#"{
            "id": 7,
            "category": 3,
            "category_name": "Groceries",
            "category_type": "expense",
            "amount": "42.50",
            "description": null,
            "date": "2024-03-09",
            "created_at": "2024-03-09T10:00:00Z"
        }"#;

        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.category_id, Some(3));
        assert_eq!(txn.amount, Decimal::from_str("42.50").unwrap());
        assert_eq!(txn.signed_amount(), Decimal::from_str("-42.50").unwrap());
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn test_transaction_with_deleted_category() {
        let json = r#"{"id": 1, "category": null, "amount": "5.00", "date": "2024-01-01"}"#;

        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.category_id, None);
        assert_eq!(txn.category_type, None);
        assert_eq!(txn.signed_amount(), Decimal::from_str("5.00").unwrap());
    }

    #[test]
    fn test_summary_accepts_float_totals() {
        let summary: Summary =
            serde_json::from_str(r#"{"income": 1500.0, "expenses": 420.5, "balance": 1079.5}"#)
                .unwrap();
        assert_eq!(summary.balance, Decimal::from_str("1079.5").unwrap());
    }

    #[test]
    fn test_category_type_field_name() {
        let json = r##"{"id": 2, "name": "Salary", "type": "income", "color": "#10B981", "transaction_count": 4}"##;

        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.category_type, CategoryType::Income);
        assert_eq!(category.transaction_count, 4);
        assert_eq!(category.description, None);
    }

    #[test]
    fn test_category_type_parse() {
        assert_eq!(CategoryType::from_str("Income").unwrap(), CategoryType::Income);
        assert!(CategoryType::from_str("savings").is_err());
    }

    #[test]
    fn test_display_name() {
        let mut user = User {
            id: 1,
            username: "ada".to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert_eq!(user.display_name(), "ada");

        user.first_name = "Ada".to_string();
        user.last_name = "Lovelace".to_string();
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_budget_over_limit() {
        let json = r#"{
            "id": 1, "category": 3, "category_name": "Dining", "amount": "100.00",
            "spent": 120.0, "remaining": -20.0, "period": "monthly",
            "start_date": "2024-03-01", "end_date": "2024-03-31"
        }"#;

        let budget: Budget = serde_json::from_str(json).unwrap();
        assert!(budget.is_over_budget());
        assert_eq!(budget.period, BudgetPeriod::Monthly);
    }
}
