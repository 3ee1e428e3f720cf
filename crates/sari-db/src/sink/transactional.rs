//! # Transactional Sink (SQLite)
//!
//! Applies each checkout as one SQLite transaction.
//!
//! ## Checkout Transaction
//! ```text
//! BEGIN
//!   UPDATE inventory SET qty = 7 WHERE id = '111'    ← 0 rows? abort
//!   UPDATE inventory SET qty = 0 WHERE id = '222'    ← qty < 0? CHECK aborts
//!   INSERT INTO sales (...)                          ← duplicate id? abort
//!   INSERT INTO sales (...)
//! COMMIT                                             ← only now visible
//! ```
//!
//! Dropping the transaction without committing rolls it back, so every `?`
//! inside [`SqliteCommitSink::commit_checkout`] leaves the tables untouched.
//!
//! ## Wipe
//! Each collection is cleared in its own transaction: read every id, then
//! one batched `DELETE ... WHERE id IN (...)`. A failure stops the wipe and
//! reports the collections already cleared.

use sari_core::{
    Catalog, CommitSink, Collection, DataFeed, ExpenseRecord, InventoryDelta, InventoryItem, SaleRecord,
    SinkError, SinkResult, StoreSnapshot, WipeReport,
};
use tracing::{debug, error, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{delete_ids_in, ids_in, inventory, sale};

/// Commit sink backed by the SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCommitSink {
    db: Database,
}

impl SqliteCommitSink {
    pub fn new(db: Database) -> Self {
        SqliteCommitSink { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn commit_checkout(&self, deltas: &[InventoryDelta], sales: &[SaleRecord]) -> DbResult<()> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("Failed to start transaction: {}", e)))?;

        for delta in deltas {
            inventory::set_qty_in(&mut tx, &delta.id, delta.new_qty).await?;
        }
        for record in sales {
            sale::insert_in(&mut tx, record).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("Failed to commit transaction: {}", e)))?;
        Ok(())
    }

    async fn wipe_collection(&self, collection: Collection) -> DbResult<u64> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("Failed to start transaction: {}", e)))?;

        let ids = ids_in(&mut tx, collection).await?;
        let removed = delete_ids_in(&mut tx, collection, &ids).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(format!("Failed to commit transaction: {}", e)))?;
        debug!(%collection, removed, "Collection wiped");
        Ok(removed)
    }
}

impl CommitSink for SqliteCommitSink {
    async fn apply_checkout(&self, deltas: &[InventoryDelta], sales: &[SaleRecord]) -> SinkResult<()> {
        match self.commit_checkout(deltas, sales).await {
            Ok(()) => {
                info!(deltas = deltas.len(), sales = sales.len(), "Checkout transaction committed");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Checkout transaction rolled back");
                Err(err.into_commit_failure())
            }
        }
    }

    async fn upsert_item(&self, item: &InventoryItem) -> SinkResult<()> {
        Ok(self.db.inventory().upsert(item).await?)
    }

    async fn delete_item(&self, id: &str) -> SinkResult<()> {
        Ok(self.db.inventory().delete(id).await?)
    }

    async fn record_expense(&self, expense: &ExpenseRecord) -> SinkResult<()> {
        Ok(self.db.expenses().upsert(expense).await?)
    }

    async fn delete_expense(&self, id: &str) -> SinkResult<()> {
        Ok(self.db.expenses().delete(id).await?)
    }

    async fn wipe_all(&self) -> SinkResult<WipeReport> {
        let mut report = WipeReport::default();

        for collection in Collection::ALL {
            match self.wipe_collection(collection).await {
                Ok(removed) => report.cleared.push((collection, removed)),
                Err(err) => {
                    warn!(%collection, error = %err, "Wipe stopped");
                    return Err(SinkError::ResetFailed {
                        cleared: report.cleared.iter().map(|(c, _)| *c).collect(),
                        failed: collection,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(removed = report.total(), "All collections wiped");
        Ok(report)
    }
}

impl DataFeed for SqliteCommitSink {
    async fn load(&self) -> SinkResult<StoreSnapshot> {
        let read = async {
            let items = self.db.inventory().list_all().await?;
            let sales = self.db.sales().list_all().await?;
            let expenses = self.db.expenses().list_all().await?;
            Ok::<_, DbError>(StoreSnapshot::new(Catalog::from_items(items), sales, expenses))
        };
        read.await.map_err(DbError::into_read_failure)
    }
}
