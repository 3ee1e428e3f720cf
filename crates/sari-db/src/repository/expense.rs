//! # Expense Repository

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use sari_core::ExpenseRecord;

const SELECT_EXPENSE: &str = "SELECT id, title, amount_centavos, date FROM expenses";

/// Repository for expense rows.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<ExpenseRecord>> {
        let expenses = sqlx::query_as::<_, ExpenseRecord>(&format!("{} ORDER BY date, rowid", SELECT_EXPENSE))
            .fetch_all(&self.pool)
            .await?;
        Ok(expenses)
    }

    /// Expenses dated `start..=end`.
    pub async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<ExpenseRecord>> {
        let expenses = sqlx::query_as::<_, ExpenseRecord>(&format!(
            "{} WHERE date BETWEEN ?1 AND ?2 ORDER BY date, rowid",
            SELECT_EXPENSE
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }

    /// Inserts a new expense or applies an edit to an existing one.
    ///
    /// An edit changes the title and amount; the stored date is kept.
    pub async fn upsert(&self, expense: &ExpenseRecord) -> DbResult<()> {
        debug!(id = %expense.id, amount = expense.amount_centavos, "Saving expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, title, amount_centavos, date)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                amount_centavos = excluded.amount_centavos
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.title)
        .bind(expense.amount_centavos)
        .bind(expense.date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("expense", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
