//! Mock implementations for testing
//!
//! These mocks enable runtime testing without a running expense service.

use crate::client::{ApiError, ExpenseApi};
use crate::expense::{
    CreateExpenseRequest, DetailResponse, ExpenseRecord, RangeQuery, UpdateExpenseRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create(CreateExpenseRequest),
    List(RangeQuery),
    Update(i64, UpdateExpenseRequest),
    Delete(i64),
}

/// Mock expense service that returns queued responses
///
/// An operation with nothing queued fails as if the service were down.
#[derive(Default)]
pub struct MockExpenseApi {
    created: Mutex<VecDeque<Result<ExpenseRecord, ApiError>>>,
    listed: Mutex<VecDeque<Result<Vec<ExpenseRecord>, ApiError>>>,
    updated: Mutex<VecDeque<Result<ExpenseRecord, ApiError>>>,
    deleted: Mutex<VecDeque<Result<DetailResponse, ApiError>>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<ApiCall>>,
}

#[allow(dead_code)]
impl MockExpenseApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_created(&self, response: Result<ExpenseRecord, ApiError>) {
        self.created.lock().unwrap().push_back(response);
    }

    pub fn queue_listed(&self, response: Result<Vec<ExpenseRecord>, ApiError>) {
        self.listed.lock().unwrap().push_back(response);
    }

    pub fn queue_updated(&self, response: Result<ExpenseRecord, ApiError>) {
        self.updated.lock().unwrap().push_back(response);
    }

    pub fn queue_deleted(&self, response: Result<DetailResponse, ApiError>) {
        self.deleted.lock().unwrap().push_back(response);
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ApiError::Transport("No mock response queued".to_string())))
}

#[async_trait]
impl ExpenseApi for MockExpenseApi {
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<ExpenseRecord, ApiError> {
        self.record(ApiCall::Create(request.clone()));
        next(&self.created)
    }

    async fn list_expenses(&self, range: &RangeQuery) -> Result<Vec<ExpenseRecord>, ApiError> {
        self.record(ApiCall::List(range.clone()));
        next(&self.listed)
    }

    async fn update_expense(
        &self,
        id: i64,
        request: &UpdateExpenseRequest,
    ) -> Result<ExpenseRecord, ApiError> {
        self.record(ApiCall::Update(id, request.clone()));
        next(&self.updated)
    }

    async fn delete_expense(&self, id: i64) -> Result<DetailResponse, ApiError> {
        self.record(ApiCall::Delete(id));
        next(&self.deleted)
    }
}
