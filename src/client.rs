//! HTTP client for the expense service, as used by the conversation agent

use crate::expense::{
    CreateExpenseRequest, DetailResponse, ExpenseRecord, RangeQuery, UpdateExpenseRequest,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Failure of a call to the expense service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("{}", rejection_message(.status, .detail))]
    Rejected { status: u16, detail: Option<String> },
    /// The service could not be reached at all
    #[error("transport failure: {0}")]
    Transport(String),
    /// The service answered success with a body we cannot read
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)] // thiserror passes fields by reference
fn rejection_message(status: &u16, detail: &Option<String>) -> String {
    detail
        .clone()
        .unwrap_or_else(|| format!("server returned HTTP {status}"))
}

/// Operations of the expense service
#[async_trait]
pub trait ExpenseApi: Send + Sync {
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<ExpenseRecord, ApiError>;

    async fn list_expenses(&self, range: &RangeQuery) -> Result<Vec<ExpenseRecord>, ApiError>;

    async fn update_expense(
        &self,
        id: i64,
        request: &UpdateExpenseRequest,
    ) -> Result<ExpenseRecord, ApiError>;

    async fn delete_expense(&self, id: i64) -> Result<DetailResponse, ApiError>;
}

/// `ExpenseApi` over HTTP with reqwest
pub struct HttpExpenseClient {
    client: Client,
    base_url: String,
}

impl HttpExpenseClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let start = std::time::Instant::now();
        let result = execute(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(_) => tracing::debug!(operation, %duration_ms, "Expense API call completed"),
            Err(ApiError::Rejected { status, detail }) => tracing::info!(
                operation,
                %duration_ms,
                status,
                detail = detail.as_deref().unwrap_or(""),
                "Expense API rejected request"
            ),
            Err(e) => tracing::error!(operation, %duration_ms, error = %e, "Expense API call failed"),
        }

        result
    }
}

async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(rejection(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

fn rejection(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<DetailResponse>(body)
        .ok()
        .map(|d| d.detail);
    ApiError::Rejected {
        status: status.as_u16(),
        detail,
    }
}

#[async_trait]
impl ExpenseApi for HttpExpenseClient {
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<ExpenseRecord, ApiError> {
        let url = format!("{}/expenses/", self.base_url);
        self.send("create", self.client.post(url).json(request)).await
    }

    async fn list_expenses(&self, range: &RangeQuery) -> Result<Vec<ExpenseRecord>, ApiError> {
        let url = format!("{}/expenses/", self.base_url);
        self.send("list", self.client.get(url).query(range)).await
    }

    async fn update_expense(
        &self,
        id: i64,
        request: &UpdateExpenseRequest,
    ) -> Result<ExpenseRecord, ApiError> {
        let url = format!("{}/expenses/{id}", self.base_url);
        self.send("update", self.client.put(url).json(request)).await
    }

    async fn delete_expense(&self, id: i64) -> Result<DetailResponse, ApiError> {
        let url = format!("{}/expenses/{id}", self.base_url);
        self.send("delete", self.client.delete(url)).await
    }
}
