//! # Store Snapshot
//!
//! The explicit context every engine operation runs against: the catalog plus
//! the sales and expense history, as last loaded from the [`DataFeed`].
//!
//! ## Write Discipline
//! ```text
//! operator action
//!      │
//!      ▼
//! validate against THIS snapshot
//!      │
//!      ▼
//! sink.write(...) ──── Err ──► snapshot untouched, error surfaced
//!      │
//!      Ok
//!      ▼
//! apply the same change to the snapshot
//! ```
//!
//! Nothing in here is global. The register owns one snapshot and passes it
//! by reference.
//!
//! [`DataFeed`]: crate::sink::DataFeed

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{Catalog, UpsertOutcome};
use crate::error::{CoreError, CoreResult};
use crate::sink::{CommitSink, InventoryDelta, SinkError, WipeReport};
use crate::types::{Collection, ExpenseRecord, InventoryItem, SaleRecord};

/// Current state of one store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

impl StoreSnapshot {
    pub fn new(catalog: Catalog, sales: Vec<SaleRecord>, expenses: Vec<ExpenseRecord>) -> Self {
        StoreSnapshot {
            catalog,
            sales,
            expenses,
        }
    }

    // =========================================================================
    // Pure transforms
    // =========================================================================

    /// Applies a committed checkout: absolute quantities, then new sales.
    pub fn apply_checkout(&mut self, deltas: &[InventoryDelta], sales: &[SaleRecord]) {
        self.catalog.apply_deltas(deltas);
        self.sales.extend_from_slice(sales);
    }

    /// The whole post-checkout state, computed without touching `self`.
    ///
    /// This is what the optimistic-local strategy serializes and writes in
    /// one go.
    pub fn after_checkout(&self, deltas: &[InventoryDelta], sales: &[SaleRecord]) -> StoreSnapshot {
        let mut next = self.clone();
        next.apply_checkout(deltas, sales);
        next
    }

    /// Inserts or replaces an expense by id.
    pub fn put_expense(&mut self, expense: ExpenseRecord) {
        match self.expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense,
            None => self.expenses.push(expense),
        }
    }

    pub fn find_expense(&self, id: &str) -> Option<&ExpenseRecord> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn take_expense(&mut self, id: &str) -> Option<ExpenseRecord> {
        let idx = self.expenses.iter().position(|e| e.id == id)?;
        Some(self.expenses.remove(idx))
    }

    /// Empties one collection.
    pub fn clear(&mut self, collection: Collection) {
        match collection {
            Collection::Inventory => self.catalog.clear(),
            Collection::Sales => self.sales.clear(),
            Collection::Expenses => self.expenses.clear(),
        }
    }

    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Inventory => self.catalog.len(),
            Collection::Sales => self.sales.len(),
            Collection::Expenses => self.expenses.len(),
        }
    }

    // =========================================================================
    // Persist, then apply
    // =========================================================================

    /// Saves an item through the sink and then into the catalog.
    pub async fn save_item<S: CommitSink>(&mut self, sink: &S, item: InventoryItem) -> CoreResult<UpsertOutcome> {
        sink.upsert_item(&item).await?;
        Ok(self.catalog.upsert(item))
    }

    /// Deletes an item. Sales that reference it keep their own copy of the
    /// name and prices.
    pub async fn delete_item<S: CommitSink>(&mut self, sink: &S, barcode: &str) -> CoreResult<InventoryItem> {
        let id = match self.catalog.lookup(barcode) {
            Some(item) => item.id.clone(),
            None => return Err(CoreError::ItemNotFound(barcode.trim().to_string())),
        };

        sink.delete_item(&id).await?;
        info!(barcode = %id, "Item deleted");
        self.catalog
            .delete(&id)
            .ok_or(CoreError::ItemNotFound(id))
    }

    /// Records a new or edited expense.
    pub async fn save_expense<S: CommitSink>(&mut self, sink: &S, expense: ExpenseRecord) -> CoreResult<()> {
        sink.record_expense(&expense).await?;
        self.put_expense(expense);
        Ok(())
    }

    pub async fn delete_expense<S: CommitSink>(&mut self, sink: &S, id: &str) -> CoreResult<ExpenseRecord> {
        if self.find_expense(id).is_none() {
            return Err(CoreError::ItemNotFound(id.to_string()));
        }

        sink.delete_expense(id).await?;
        self.take_expense(id)
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))
    }

    /// Wipes every collection.
    ///
    /// ## Partial failure
    /// When the sink stops part-way, the collections it reports as cleared
    /// are cleared here too so the snapshot matches storage, and the error
    /// names the collection that still holds data.
    pub async fn wipe<S: CommitSink>(&mut self, sink: &S) -> CoreResult<WipeReport> {
        match sink.wipe_all().await {
            Ok(report) => {
                for collection in Collection::ALL {
                    self.clear(collection);
                }
                info!(removed = report.total(), "All store data wiped");
                Ok(report)
            }
            Err(SinkError::ResetFailed {
                cleared,
                failed,
                reason,
            }) => {
                for collection in &cleared {
                    self.clear(*collection);
                }
                warn!(?cleared, %failed, %reason, "Wipe stopped part-way");
                Err(CoreError::ResetFailed {
                    cleared,
                    failed,
                    reason,
                })
            }
            Err(other) => Err(other.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
