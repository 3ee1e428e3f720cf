//! # Inventory Repository
//!
//! Rows of the `inventory` table, one per barcode.
//!
//! ## Key Operations
//! - Full-field upsert (the ADD-mode save)
//! - Absolute quantity update (the checkout delta)
//! - Delete with no cascade
//!
//! Rows are listed in insertion order (`rowid`); an upsert of an existing
//! barcode keeps its position.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use sari_core::InventoryItem;

const SELECT_ITEM: &str = "SELECT id, name, cost_centavos, price_centavos, qty FROM inventory";

/// Repository for inventory rows.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// All items in listing order.
    pub async fn list_all(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!("{} ORDER BY rowid", SELECT_ITEM))
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Gets an item by barcode.
    pub async fn get(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!("{} WHERE id = ?", SELECT_ITEM))
            .bind(id.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Inserts the item or replaces every field of the existing row.
    pub async fn upsert(&self, item: &InventoryItem) -> DbResult<()> {
        debug!(barcode = %item.id, qty = item.qty, "Upserting inventory row");

        sqlx::query(
            r#"
            INSERT INTO inventory (id, name, cost_centavos, price_centavos, qty, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                cost_centavos = excluded.cost_centavos,
                price_centavos = excluded.price_centavos,
                qty = excluded.qty,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(item.id.trim())
        .bind(&item.name)
        .bind(item.cost_centavos)
        .bind(item.price_centavos)
        .bind(item.qty)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes one row. Sales are untouched.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = ?")
            .bind(id.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("inventory", id.trim()));
        }
        Ok(())
    }

    /// Number of rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inventory")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Sets the absolute quantity of one row on the caller's connection.
///
/// ## Errors
/// - `NotFound` when the barcode has no row (deleted since the scan)
/// - `CheckViolation` when `qty` is negative
pub async fn set_qty_in(conn: &mut SqliteConnection, id: &str, qty: i64) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE inventory SET qty = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?2",
    )
    .bind(qty)
    .bind(id.trim())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("inventory", id.trim()));
    }
    Ok(())
}
