//! # Repository Module
//!
//! Table access for Sari POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteCommitSink / register                                           │
//! │       │                                                                 │
//! │       │  db.inventory().upsert(&item)                                  │
//! │       ▼                                                                 │
//! │  InventoryRepository / SaleRepository / ExpenseRepository              │
//! │  ├── pool methods   (&self, ...)          one statement, autocommit    │
//! │  └── *_in functions (&mut conn, ...)      join a caller's transaction  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`] - Catalog rows keyed by barcode
//! - [`SaleRepository`] - Append-only sale rows
//! - [`ExpenseRepository`] - Expense rows

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::error::DbResult;
use sari_core::Collection;

pub mod expense;
pub mod inventory;
pub mod sale;

pub use expense::ExpenseRepository;
pub use inventory::InventoryRepository;
pub use sale::SaleRepository;

/// Ids bound per `DELETE ... IN (...)` statement, under SQLite's variable
/// limit.
const DELETE_CHUNK: usize = 500;

/// Every id currently stored in `collection`.
pub async fn ids_in(conn: &mut SqliteConnection, collection: Collection) -> DbResult<Vec<String>> {
    let sql = format!("SELECT id FROM {}", collection.name());
    let ids = sqlx::query_scalar::<_, String>(&sql).fetch_all(&mut *conn).await?;
    Ok(ids)
}

/// Deletes the given ids from `collection` in batched statements.
///
/// Runs on the caller's connection; wrap it in a transaction to make the
/// whole delete one unit.
pub async fn delete_ids_in(conn: &mut SqliteConnection, collection: Collection, ids: &[String]) -> DbResult<u64> {
    let mut removed = 0;
    for chunk in ids.chunks(DELETE_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("DELETE FROM {} WHERE id IN (", collection.name()));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        removed += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(removed)
}
