//! HTTP implementation of [`BudgetApi`] over `reqwest`

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use super::error::{ApiError, ApiResult};
use super::BudgetApi;
use crate::models::{
    AuthResponse, Budget, Category, LoginRequest, NewBudget, NewCategory, NewTransaction,
    RecordId, RegisterRequest, Summary, Transaction, TransactionQuery, User,
};
use crate::session::SharedSession;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL every endpoint path is appended to (e.g. "http://localhost:8000/api")
    pub base_url: String,
    /// Per-request timeout; `None` leaves it to the transport
    pub request_timeout: Option<Duration>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
        }
    }
}

/// Budget API client backed by `reqwest`
///
/// Reads the token from the shared session cell on every request, so a
/// login or logout through the session manager takes effect immediately.
pub struct HttpBudgetApi {
    client: Client,
    base_url: String,
    session: SharedSession,
}

impl HttpBudgetApi {
    pub fn new(config: ApiClientConfig, session: SharedSession) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach `Authorization: Token <value>` when a session is active
    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => builder.header(AUTHORIZATION, format!("Token {}", session.token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> ApiResult<Response> {
        let response = self
            .authorize(builder)
            .await
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(path, status = status.as_u16(), "API request succeeded");
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status.as_u16(), path, &body);
            tracing::debug!(path, status = status.as_u16(), error = %err, "API request failed");
            Err(err)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(self.client.get(self.url(path)), path).await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .send(self.client.post(self.url(path)).json(body), path)
            .await?;
        Self::decode(response).await
    }

    async fn put_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .send(self.client.put(self.url(path)).json(body), path)
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.client.delete(self.url(path)), path).await?;
        Ok(())
    }
}

#[async_trait]
impl BudgetApi for HttpBudgetApi {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.post_json("/auth/register/", request).await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.post_json("/auth/login/", request).await
    }

    async fn logout(&self) -> ApiResult<()> {
        let path = "/auth/logout/";
        self.send(self.client.post(self.url(path)), path).await?;
        Ok(())
    }

    async fn profile(&self) -> ApiResult<User> {
        self.get_json("/auth/profile/").await
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.get_json("/categories/").await
    }

    async fn create_category(&self, category: &NewCategory) -> ApiResult<Category> {
        self.post_json("/categories/", category).await
    }

    async fn update_category(&self, id: RecordId, category: &NewCategory) -> ApiResult<Category> {
        self.put_json(&format!("/categories/{}/", id), category).await
    }

    async fn delete_category(&self, id: RecordId) -> ApiResult<()> {
        self.delete(&format!("/categories/{}/", id)).await
    }

    async fn list_transactions(&self, query: &TransactionQuery) -> ApiResult<Vec<Transaction>> {
        self.get_json(&format!("/transactions/{}", query.to_query_string()))
            .await
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> ApiResult<Transaction> {
        self.post_json("/transactions/", transaction).await
    }

    async fn update_transaction(
        &self,
        id: RecordId,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction> {
        self.put_json(&format!("/transactions/{}/", id), transaction)
            .await
    }

    async fn delete_transaction(&self, id: RecordId) -> ApiResult<()> {
        self.delete(&format!("/transactions/{}/", id)).await
    }

    async fn summary(&self, query: &TransactionQuery) -> ApiResult<Summary> {
        self.get_json(&format!("/transactions/summary/{}", query.to_query_string()))
            .await
    }

    async fn list_budgets(&self) -> ApiResult<Vec<Budget>> {
        self.get_json("/budgets/").await
    }

    async fn create_budget(&self, budget: &NewBudget) -> ApiResult<Budget> {
        self.post_json("/budgets/", budget).await
    }

    async fn update_budget(&self, id: RecordId, budget: &NewBudget) -> ApiResult<Budget> {
        self.put_json(&format!("/budgets/{}/", id), budget).await
    }

    async fn delete_budget(&self, id: RecordId) -> ApiResult<()> {
        self.delete(&format!("/budgets/{}/", id)).await
    }
}
