//! Database schema

/// SQL schema for initialization.
///
/// `AUTOINCREMENT` keeps ids of deleted rows from being handed out again.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    amount_local REAL NOT NULL,
    amount_foreign REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_expenses_title ON expenses(title);
CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
";

/// Columns selected for every expense read, in `parse_expense_row` order
pub const EXPENSE_COLUMNS: &str = "id, title, date, amount_local, amount_foreign";

/// Field changes applied by a single update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub title: Option<String>,
    pub date: Option<chrono::NaiveDate>,
    /// Local amount together with its freshly converted foreign amount
    pub amounts: Option<(f64, f64)>,
}
