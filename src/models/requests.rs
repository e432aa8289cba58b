//! Request bodies and list filters

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{BudgetPeriod, CategoryType, User};
use super::RecordId;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Fields accepted by the registration endpoint
///
/// `password2` is the confirmation field; the server rejects mismatches.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Body returned by login and register
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewTransaction {
    #[serde(rename = "category")]
    pub category_id: RecordId,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewBudget {
    #[serde(rename = "category")]
    pub category_id: RecordId,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Filters for the transaction list and summary endpoints
///
/// The server only applies the date window when both bounds are given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<RecordId>,
}

impl TransactionQuery {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            category: None,
        }
    }

    pub fn category(mut self, category_id: RecordId) -> Self {
        self.category = Some(category_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.category.is_none()
    }

    /// Encode as a URL query string, including the leading `?`
    ///
    /// Returns an empty string when no filter is set.
    pub fn to_query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(start) = self.start_date {
            params.push(format!(
                "start_date={}",
                urlencoding::encode(&start.format("%Y-%m-%d").to_string())
            ));
        }
        if let Some(end) = self.end_date {
            params.push(format!(
                "end_date={}",
                urlencoding::encode(&end.format("%Y-%m-%d").to_string())
            ));
        }
        if let Some(category) = self.category {
            params.push(format!("category={}", category));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_empty_query_string() {
        assert_eq!(TransactionQuery::default().to_query_string(), "");
        assert!(TransactionQuery::default().is_empty());
    }

    #[test]
    fn test_query_string_with_filters() {
        let query = TransactionQuery::between(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .category(4);

        assert_eq!(
            query.to_query_string(),
            "?start_date=2024-01-01&end_date=2024-01-31&category=4"
        );
    }

    #[test]
    fn test_new_transaction_body() {
        let body = NewTransaction {
            category_id: 3,
            amount: Decimal::from_str("19.99").unwrap(),
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["category"], 3);
        assert_eq!(json["amount"], "19.99");
        assert_eq!(json["date"], "2024-05-02");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_register_body_omits_missing_names() {
        let body = RegisterRequest {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "analytical".into(),
            password2: "analytical".into(),
            ..Default::default()
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["password2"], "analytical");
        assert!(json.get("first_name").is_none());
    }
}
