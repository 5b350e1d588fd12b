//! Database module for the expense store
//!
//! Every public operation runs inside its own transaction.

mod schema;

pub use schema::ExpenseChanges;
use schema::{EXPENSE_COLUMNS, SCHEMA};

use crate::expense::{Expense, STORAGE_DATE_FORMAT};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(i64),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Expense Operations ====================

    /// Insert a new expense; the id is assigned by the store
    pub fn insert_expense(
        &self,
        title: &str,
        date: NaiveDate,
        amount_local: f64,
        amount_foreign: f64,
    ) -> DbResult<Expense> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO expenses (title, date, amount_local, amount_foreign) VALUES (?1, ?2, ?3, ?4)",
            params![title, storage_date(date), amount_local, amount_foreign],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Expense {
            id,
            title: title.to_string(),
            date,
            amount_local,
            amount_foreign,
        })
    }

    /// Get expense by ID
    pub fn get_expense(&self, id: i64) -> DbResult<Expense> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"),
            params![id],
            parse_expense_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::ExpenseNotFound(id),
            other => DbError::Sqlite(other),
        })
    }

    /// List expenses dated within `[start, end]`, ascending by id
    pub fn list_expenses_between(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<Expense>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses
             WHERE date >= ?1 AND date <= ?2
             ORDER BY id ASC"
        ))?;

        let rows = stmt.query_map(
            params![storage_date(start), storage_date(end)],
            parse_expense_row,
        )?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Apply `changes` to an existing expense and return the stored result
    pub fn update_expense(&self, id: i64, changes: &ExpenseChanges) -> DbResult<Expense> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let (amount_local, amount_foreign) = changes.amounts.unzip();
        let updated = tx.execute(
            "UPDATE expenses SET
                title = COALESCE(?2, title),
                date = COALESCE(?3, date),
                amount_local = COALESCE(?4, amount_local),
                amount_foreign = COALESCE(?5, amount_foreign)
             WHERE id = ?1",
            params![
                id,
                changes.title,
                changes.date.map(storage_date),
                amount_local,
                amount_foreign
            ],
        )?;

        if updated == 0 {
            // Dropping the transaction rolls it back
            return Err(DbError::ExpenseNotFound(id));
        }

        let expense = tx
            .query_row(
                &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"),
                params![id],
                parse_expense_row,
            )
            .optional()?
            .ok_or(DbError::ExpenseNotFound(id))?;
        tx.commit()?;

        Ok(expense)
    }

    /// Delete an expense
    pub fn delete_expense(&self, id: i64) -> DbResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::ExpenseNotFound(id));
        }
        tx.commit()?;

        Ok(())
    }

    /// Number of stored expenses
    pub fn count_expenses(&self) -> DbResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn storage_date(date: NaiveDate) -> String {
    date.format(STORAGE_DATE_FORMAT).to_string()
}

fn parse_expense_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    let date_text: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_text, STORAGE_DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Expense {
        id: row.get(0)?,
        title: row.get(1)?,
        date,
        amount_local: row.get(3)?,
        amount_foreign: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_expense("Coffee", day(2024, 1, 2), 50.0, 2.05).unwrap();
        let second = db.insert_expense("Tea", day(2024, 1, 3), 40.0, 1.64).unwrap();
        assert!(second.id > first.id);
        assert_eq!(db.get_expense(first.id).unwrap(), first);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_expense("Coffee", day(2024, 1, 2), 50.0, 2.0).unwrap();
        db.delete_expense(first.id).unwrap();
        let second = db.insert_expense("Tea", day(2024, 1, 3), 40.0, 1.6).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_range_is_inclusive_and_ordered_by_id() {
        let db = Database::open_in_memory().unwrap();
        let late = db.insert_expense("Late", day(2024, 1, 31), 1.0, 0.1).unwrap();
        let early = db.insert_expense("Early", day(2024, 1, 1), 2.0, 0.2).unwrap();
        db.insert_expense("Outside", day(2024, 2, 1), 3.0, 0.3).unwrap();

        let found = db.list_expenses_between(day(2024, 1, 1), day(2024, 1, 31)).unwrap();
        let ids: Vec<i64> = found.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
    }

    #[test]
    fn test_range_spanning_years_compares_dates_not_text() {
        let db = Database::open_in_memory().unwrap();
        db.insert_expense("December", day(2023, 12, 15), 1.0, 0.1).unwrap();
        db.insert_expense("March", day(2024, 3, 1), 1.0, 0.1).unwrap();

        let found = db.list_expenses_between(day(2023, 12, 1), day(2024, 1, 31)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "December");
    }

    #[test]
    fn test_partial_update_keeps_other_columns() {
        let db = Database::open_in_memory().unwrap();
        let original = db.insert_expense("Rent", day(2024, 5, 1), 1000.0, 41.0).unwrap();

        let changes = ExpenseChanges {
            title: Some("Rent May".to_string()),
            ..Default::default()
        };
        let updated = db.update_expense(original.id, &changes).unwrap();

        assert_eq!(updated.title, "Rent May");
        assert_eq!(updated.date, original.date);
        assert!((updated.amount_local - 1000.0).abs() < f64::EPSILON);
        assert!((updated.amount_foreign - 41.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_missing_expense() {
        let db = Database::open_in_memory().unwrap();
        let result = db.update_expense(999, &ExpenseChanges::default());
        assert!(matches!(result, Err(DbError::ExpenseNotFound(999))));
    }

    #[test]
    fn test_delete_missing_expense_leaves_store_alone() {
        let db = Database::open_in_memory().unwrap();
        db.insert_expense("Coffee", day(2024, 1, 2), 50.0, 2.0).unwrap();
        assert!(matches!(db.delete_expense(42), Err(DbError::ExpenseNotFound(42))));
        assert_eq!(db.count_expenses().unwrap(), 1);
    }

    #[test]
    fn test_reopen_file_database_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_expense("Coffee", day(2024, 1, 2), 50.0, 2.0).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_expenses().unwrap(), 1);
    }
}
