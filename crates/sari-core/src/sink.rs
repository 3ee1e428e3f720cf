//! # Commit Sink & Data Feed
//!
//! The boundary between the consistency engine and whatever persists its
//! output. The core defines the contracts; `sari-db` implements them.
//!
//! ## Two Strategies, One Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CommitSink strategies                            │
//! │                                                                         │
//! │  Optimistic-local (SnapshotSink)                                       │
//! │  ───────────────────────────────                                       │
//! │  post-checkout collections computed in memory                          │
//! │        └──► ONE write of the serialized snapshot (replace whole file)  │
//! │                                                                         │
//! │  Transactional-remote (SqliteCommitSink)                               │
//! │  ───────────────────────────────────────                               │
//! │  [update inventory/111 qty=7, update inventory/222 qty=0,              │
//! │   insert sales/…, insert sales/…]                                      │
//! │        └──► ONE all-or-nothing batch                                   │
//! │                                                                         │
//! │  Either way: Ok → everything visible, Err → nothing visible            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The traits use `async fn`; implementations are used through generics, so
//! no boxing is needed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::error::CoreError;
use crate::store::StoreSnapshot;
use crate::types::{Collection, ExpenseRecord, InventoryItem, SaleRecord};

// =============================================================================
// Mutations
// =============================================================================

/// Absolute post-checkout quantity of one inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryDelta {
    /// Barcode of the inventory record.
    pub id: String,
    /// Units on hand after the checkout.
    pub new_qty: i64,
}

/// Outcome of a successful wipe: how many records each collection lost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipeReport {
    pub cleared: Vec<(Collection, u64)>,
}

impl WipeReport {
    pub fn total(&self) -> u64 {
        self.cleared.iter().map(|(_, n)| n).sum()
    }
}

// =============================================================================
// Sink Error
// =============================================================================

/// Failures reported by a persistence target.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The checkout batch was rejected as a whole.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// A single-record write (upsert, delete, expense) failed.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Loading the current state failed.
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// A wipe stopped part-way. `cleared` lists the collections that were
    /// fully deleted before `failed` errored; the operator retries the rest.
    #[error("Reset failed on {failed}: {reason}")]
    ResetFailed {
        cleared: Vec<Collection>,
        failed: Collection,
        reason: String,
    },
}

impl From<SinkError> for CoreError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::ResetFailed {
                cleared,
                failed,
                reason,
            } => CoreError::ResetFailed {
                cleared,
                failed,
                reason,
            },
            SinkError::CommitFailed(reason)
            | SinkError::WriteFailed(reason)
            | SinkError::ReadFailed(reason) => CoreError::CommitFailed(reason),
        }
    }
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

// =============================================================================
// Traits
// =============================================================================

/// Persistence target for every write the engine derives.
///
/// ## Contract
/// - `apply_checkout` is atomic: on `Err` no delta and no sale is visible.
/// - `wipe_all` deletes each collection in one batch and reports partial
///   progress through [`SinkError::ResetFailed`].
#[allow(async_fn_in_trait)]
pub trait CommitSink {
    /// Applies inventory deltas and inserts new sales as one unit.
    async fn apply_checkout(&self, deltas: &[InventoryDelta], sales: &[SaleRecord]) -> SinkResult<()>;

    /// Full-field replace or insert of one inventory record.
    async fn upsert_item(&self, item: &InventoryItem) -> SinkResult<()>;

    /// Deletes one inventory record. Sales are untouched.
    async fn delete_item(&self, id: &str) -> SinkResult<()>;

    /// Inserts or replaces an expense.
    async fn record_expense(&self, expense: &ExpenseRecord) -> SinkResult<()>;

    /// Deletes an expense.
    async fn delete_expense(&self, id: &str) -> SinkResult<()>;

    /// Deletes all inventory, sales and expenses.
    async fn wipe_all(&self) -> SinkResult<WipeReport>;
}

/// Passive read side: the register pulls the current state when it needs it.
///
/// The engine's algorithms run over the returned snapshot and never see the
/// mechanism behind it.
#[allow(async_fn_in_trait)]
pub trait DataFeed {
    async fn load(&self) -> SinkResult<StoreSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_errors_map_to_core_errors() {
        let err: CoreError = SinkError::CommitFailed("offline".to_string()).into();
        assert!(matches!(err, CoreError::CommitFailed(msg) if msg.contains("offline")));

        let err: CoreError = SinkError::ResetFailed {
            cleared: vec![Collection::Inventory],
            failed: Collection::Sales,
            reason: "locked".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            CoreError::ResetFailed {
                failed: Collection::Sales,
                ..
            }
        ));
    }

    #[test]
    fn test_wipe_report_total() {
        let report = WipeReport {
            cleared: vec![
                (Collection::Inventory, 3),
                (Collection::Sales, 10),
                (Collection::Expenses, 0),
            ],
        };
        assert_eq!(report.total(), 13);
    }
}
