//! Dashboard forms
//!
//! Raw user input for creating categories, transactions and budgets.
//! Validation is limited to required fields being present and parseable;
//! everything else is the server's call.
//!
//! [`FormState`] follows the dashboard's submit rules: a confirmed submit
//! resets and closes the form, a failed one leaves it open with the input
//! intact and the error attached.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{
    BudgetPeriod, CategoryType, NewBudget, NewCategory, NewTransaction, RecordId,
};

/// Default color offered for new categories
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Form validation and submission errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is invalid: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// The server refused the submission
    #[error("{0}")]
    Rejected(String),
}

/// A form that turns raw input into a request body
pub trait Form: Default {
    type Output;

    fn validate(&self) -> Result<Self::Output, FormError>;
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(value)
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<RecordId, FormError> {
    required(field, value)?
        .parse::<RecordId>()
        .map_err(|e| FormError::Invalid {
            field,
            message: e.to_string(),
        })
}

fn parse_amount(field: &'static str, value: &str) -> Result<Decimal, FormError> {
    Decimal::from_str(required(field, value)?).map_err(|e| FormError::Invalid {
        field,
        message: e.to_string(),
    })
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(required(field, value)?, "%Y-%m-%d").map_err(|e| {
        FormError::Invalid {
            field,
            message: e.to_string(),
        }
    })
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Input for a new category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm {
    pub name: String,
    pub category_type: CategoryType,
    pub color: String,
    pub description: String,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            category_type: CategoryType::Expense,
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            description: String::new(),
        }
    }
}

impl Form for CategoryForm {
    type Output = NewCategory;

    fn validate(&self) -> Result<NewCategory, FormError> {
        let name = required("name", &self.name)?;
        let color = optional(&self.color).unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());

        Ok(NewCategory {
            name: name.to_string(),
            category_type: self.category_type,
            color,
            description: optional(&self.description),
        })
    }
}

/// Input for a new transaction; the date defaults to today
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionForm {
    pub category: String,
    pub amount: String,
    pub description: String,
    pub date: String,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self {
            category: String::new(),
            amount: String::new(),
            description: String::new(),
            date: today(),
        }
    }
}

impl Form for TransactionForm {
    type Output = NewTransaction;

    fn validate(&self) -> Result<NewTransaction, FormError> {
        Ok(NewTransaction {
            category_id: parse_id("category", &self.category)?,
            amount: parse_amount("amount", &self.amount)?,
            description: optional(&self.description),
            date: parse_date("date", &self.date)?,
        })
    }
}

/// Input for a new budget
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetForm {
    pub category: String,
    pub amount: String,
    pub period: BudgetPeriod,
    pub start_date: String,
    pub end_date: String,
}

impl Form for BudgetForm {
    type Output = NewBudget;

    fn validate(&self) -> Result<NewBudget, FormError> {
        Ok(NewBudget {
            category_id: parse_id("category", &self.category)?,
            amount: parse_amount("amount", &self.amount)?,
            period: self.period,
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_date("end_date", &self.end_date)?,
        })
    }
}

/// A form plus its open/closed state and last error
#[derive(Debug, Clone, Default)]
pub struct FormState<F: Form> {
    pub form: F,
    pub open: bool,
    pub error: Option<String>,
}

impl<F: Form> FormState<F> {
    pub fn new() -> Self {
        Self {
            form: F::default(),
            open: false,
            error: None,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close and discard any input
    pub fn cancel(&mut self) {
        *self = Self::new();
    }

    /// Validate, then hand the request to `send`.
    ///
    /// On success the form is reset and closed. On any failure it stays
    /// open, keeps its input and records the error message.
    pub async fn submit<T, E, S, Fut>(&mut self, send: S) -> Result<T, FormError>
    where
        S: FnOnce(F::Output) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let request = match self.form.validate() {
            Ok(r) => r,
            Err(e) => {
                self.error = Some(e.to_string());
                self.open = true;
                return Err(e);
            }
        };

        match send(request).await {
            Ok(value) => {
                *self = Self::new();
                Ok(value)
            }
            Err(e) => {
                let err = FormError::Rejected(e.to_string());
                tracing::warn!(error = %err, "Form submission failed");
                self.error = Some(err.to_string());
                self.open = true;
                Err(err)
            }
        }
    }
}
