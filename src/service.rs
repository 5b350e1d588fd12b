//! Expense operations: validation, currency conversion and persistence

use crate::db::{Database, DbError, ExpenseChanges};
use crate::expense::{parse_date, Expense, InvalidDateFormat};
use crate::rates::RateOracle;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error(transparent)]
    InvalidDateFormat(#[from] InvalidDateFormat),
    #[error("Expense not found")]
    NotFound(i64),
    #[error("Storage failure: {0}")]
    Store(DbError),
}

impl From<DbError> for ExpenseError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::ExpenseNotFound(id) => ExpenseError::NotFound(id),
            other => ExpenseError::Store(other),
        }
    }
}

pub type ExpenseResult<T> = Result<T, ExpenseError>;

/// The four expense operations
///
/// The store calls are synchronous; they are short single-row statements
/// behind a mutex, so they run inline on the request task.
#[derive(Clone)]
pub struct ExpenseService {
    db: Database,
    oracle: Arc<dyn RateOracle>,
}

impl ExpenseService {
    pub fn new(db: Database, oracle: Arc<dyn RateOracle>) -> Self {
        Self { db, oracle }
    }

    /// Record a new expense, converting the amount at the current rate
    pub async fn create(&self, title: &str, date_text: &str, amount_local: f64) -> ExpenseResult<Expense> {
        let date = parse_date(date_text)?;
        let rate = self.oracle.current_rate().await;
        let expense = self
            .db
            .insert_expense(title, date, amount_local, amount_local * rate)?;

        tracing::info!(id = expense.id, rate, "Expense created");
        Ok(expense)
    }

    /// Expenses dated within the inclusive range
    pub fn list(&self, start_text: &str, end_text: &str) -> ExpenseResult<Vec<Expense>> {
        let start = parse_date(start_text)?;
        let end = parse_date(end_text)?;
        Ok(self.db.list_expenses_between(start, end)?)
    }

    /// Overwrite the supplied fields of an existing expense.
    ///
    /// All inputs are validated before anything is written, so a bad date
    /// never leaves a half-applied update behind.
    pub async fn update(
        &self,
        id: i64,
        title: Option<String>,
        date_text: Option<&str>,
        amount_local: Option<f64>,
    ) -> ExpenseResult<Expense> {
        let date = date_text.map(parse_date).transpose()?;

        // Skip the rate lookup for ids that do not exist
        self.db.get_expense(id)?;

        let amounts = match amount_local {
            Some(amount) => {
                let rate = self.oracle.current_rate().await;
                Some((amount, amount * rate))
            }
            None => None,
        };

        let changes = ExpenseChanges {
            title,
            date,
            amounts,
        };
        let expense = self.db.update_expense(id, &changes)?;

        tracing::info!(id, "Expense updated");
        Ok(expense)
    }

    /// Remove an expense
    pub fn delete(&self, id: i64) -> ExpenseResult<()> {
        self.db.delete_expense(id)?;
        tracing::info!(id, "Expense deleted");
        Ok(())
    }
}
