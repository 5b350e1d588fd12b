//! Effects produced by state transitions

use crate::expense::{CreateExpenseRequest, ExpenseRecord, RangeQuery, UpdateExpenseRequest};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a text message to the user
    Reply { text: String, show_menu: bool },

    /// Send a tabular document to the user
    SendDocument {
        table: ExpenseTable,
        caption: String,
        show_menu: bool,
    },

    // Expense service calls; each one answers with an `Event::Backend`
    CreateExpense(CreateExpenseRequest),
    ListExpenses(RangeQuery),
    UpdateExpense {
        id: i64,
        request: UpdateExpenseRequest,
    },
    DeleteExpense {
        id: i64,
    },
}

impl Effect {
    /// Prompt for the next answer, keeping the user inside the form
    pub fn prompt(text: impl Into<String>) -> Self {
        Effect::Reply {
            text: text.into(),
            show_menu: false,
        }
    }

    /// Final message of a form; brings the main menu back
    pub fn reply_with_menu(text: impl Into<String>) -> Self {
        Effect::Reply {
            text: text.into(),
            show_menu: true,
        }
    }

    #[cfg(test)]
    pub fn is_backend_call(&self) -> bool {
        matches!(
            self,
            Effect::CreateExpense(_)
                | Effect::ListExpenses(_)
                | Effect::UpdateExpense { .. }
                | Effect::DeleteExpense { .. }
        )
    }
}

/// Rows to render as a downloadable document
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseTable {
    pub filename: String,
    pub rows: Vec<ExpenseRecord>,
    /// Append a row summing the local amounts
    pub with_total: bool,
}

impl ExpenseTable {
    pub fn report(rows: Vec<ExpenseRecord>) -> Self {
        Self {
            filename: "report.csv".to_string(),
            rows,
            with_total: true,
        }
    }

    pub fn listing(rows: Vec<ExpenseRecord>) -> Self {
        Self {
            filename: "expenses.csv".to_string(),
            rows,
            with_total: false,
        }
    }

    pub fn total_local(&self) -> f64 {
        self.rows.iter().map(|r| r.amount_local).sum()
    }
}
