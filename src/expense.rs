//! Expense record and the wire date format shared by the service and the agent

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Wire format for dates: `31.12.2100`
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Canonical storage format (sortable)
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date format. Use dd.mm.YYYY")]
pub struct InvalidDateFormat;

fn date_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("static regex"))
}

/// Parse a `dd.mm.yyyy` date.
///
/// The shape check comes first: chrono alone accepts unpadded fields
/// (`1.3.2024`), which the wire format does not allow.
pub fn parse_date(text: &str) -> Result<NaiveDate, InvalidDateFormat> {
    if !date_shape().is_match(text) {
        return Err(InvalidDateFormat);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| InvalidDateFormat)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A stored expense
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub amount_local: f64,
    pub amount_foreign: f64,
}

/// Expense as it crosses the HTTP boundary (date as text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub amount_local: f64,
    pub amount_foreign: f64,
}

impl From<Expense> for ExpenseRecord {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title,
            date: format_date(expense.date),
            amount_local: expense.amount_local,
            amount_foreign: expense.amount_foreign,
        }
    }
}

/// Body of `POST /expenses/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub title: String,
    pub date: String,
    pub amount: f64,
}

/// Body of `PUT /expenses/{id}`; omitted fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Query of `GET /expenses/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuery {
    pub start_date: String,
    pub end_date: String,
}

/// Confirmation and error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
