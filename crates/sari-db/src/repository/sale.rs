//! # Sale Repository
//!
//! Append-only sale rows.
//!
//! ## Snapshot Pattern
//! Each row carries the item name, selling price and capital price as they
//! were at checkout. There is no foreign key to `inventory`; deleting or
//! repricing an item never changes a sale.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use sari_core::SaleRecord;

const SELECT_SALE: &str = r#"
    SELECT id, date, item_name, selling_price_centavos, capital_price_centavos,
           qty_sold, total_centavos, profit_centavos, created_at
    FROM sales
"#;

/// Repository for sale rows.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Full history, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(&format!(
            "{} ORDER BY date, created_at, rowid",
            SELECT_SALE
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Sales dated `start..=end`.
    pub async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(&format!(
            "{} WHERE date BETWEEN ?1 AND ?2 ORDER BY date, created_at, rowid",
            SELECT_SALE
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Inserts one sale outside any checkout transaction.
    pub async fn insert(&self, sale: &SaleRecord) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_in(&mut conn, sale).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Inserts one sale on the caller's connection.
pub async fn insert_in(conn: &mut SqliteConnection, sale: &SaleRecord) -> DbResult<()> {
    debug!(id = %sale.id, item = %sale.item_name, qty = sale.qty_sold, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, date, item_name, selling_price_centavos, capital_price_centavos,
            qty_sold, total_centavos, profit_centavos, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&sale.id)
    .bind(sale.date)
    .bind(&sale.item_name)
    .bind(sale.selling_price_centavos)
    .bind(sale.capital_price_centavos)
    .bind(sale.qty_sold)
    .bind(sale.total_centavos)
    .bind(sale.profit_centavos)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
