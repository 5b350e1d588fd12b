//! HTTP request handlers

use super::AppState;
use crate::expense::{
    CreateExpenseRequest, DetailResponse, ExpenseRecord, RangeQuery, UpdateExpenseRequest,
};
use crate::service::ExpenseError;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/expenses/", get(list_expenses).post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
        .with_state(state)
}

// ============================================================
// Extractors
// ============================================================

// Malformed input is answered with the same `{detail}` body as every other error

#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct JsonBody<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
struct Path<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
struct Query<T>(T);

// ============================================================
// Expense Operations
// ============================================================

async fn create_expense(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateExpenseRequest>,
) -> Result<Json<ExpenseRecord>, AppError> {
    let expense = state
        .expenses
        .create(&req.title, &req.date, req.amount)
        .await?;
    Ok(Json(expense.into()))
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<ExpenseRecord>>, AppError> {
    let expenses = state.expenses.list(&query.start_date, &query.end_date)?;
    Ok(Json(expenses.into_iter().map(ExpenseRecord::from).collect()))
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<UpdateExpenseRequest>,
) -> Result<Json<ExpenseRecord>, AppError> {
    let expense = state
        .expenses
        .update(id, req.title, req.date.as_deref(), req.amount)
        .await?;
    Ok(Json(expense.into()))
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DetailResponse>, AppError> {
    state.expenses.delete(id)?;
    Ok(Json(DetailResponse::new("Expense deleted")))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<ExpenseError> for AppError {
    fn from(e: ExpenseError) -> Self {
        match e {
            ExpenseError::InvalidDateFormat(_) => AppError::BadRequest(e.to_string()),
            ExpenseError::NotFound(_) => AppError::NotFound(e.to_string()),
            ExpenseError::Store(_) => {
                tracing::error!(error = %e, "Expense store failure");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(DetailResponse::new(message));
        (status, body).into_response()
    }
}
