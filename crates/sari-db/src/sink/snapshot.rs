//! # Snapshot Sink (single JSON file)
//!
//! The optimistic-local strategy: the whole store lives in one JSON document
//! and every mutation rewrites it.
//!
//! ## Write Path
//! ```text
//! lock ──► clone current ──► apply change to the clone
//!                                   │
//!                                   ▼
//!                     serialize ──► store.json.<uuid>.tmp (fsync)
//!                                   │
//!                                   ▼
//!                     rename over store.json        ← the single write
//!                                   │
//!                          Ok ──────┴────── Err
//!                          │                 │
//!                 clone becomes current   current untouched
//! ```
//!
//! The rename is what makes a checkout all-or-nothing: a reader sees either
//! the old file or the new one. There is no isolation from another process
//! writing the same file; one register per file.

use sari_core::{
    CommitSink, Collection, DataFeed, ExpenseRecord, InventoryDelta, InventoryItem, SaleRecord, SinkError,
    SinkResult, StoreSnapshot, WipeReport,
};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// File name used inside the data directory.
pub const SNAPSHOT_FILE: &str = "store.json";

/// Commit sink that persists the whole store as one JSON file.
#[derive(Debug)]
pub struct SnapshotSink {
    path: PathBuf,
    current: Mutex<StoreSnapshot>,
}

impl SnapshotSink {
    /// Opens the snapshot at `path`, or starts empty if the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let current = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<StoreSnapshot>(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No snapshot yet, starting empty");
                StoreSnapshot::default()
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            path = %path.display(),
            items = current.catalog.len(),
            sales = current.sales.len(),
            "Snapshot loaded"
        );
        Ok(SnapshotSink {
            path,
            current: Mutex::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes `next` and swaps it in with a single rename.
    async fn write(&self, next: &StoreSnapshot) -> DbResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let bytes = serde_json::to_vec_pretty(next)?;
        let tmp = self
            .path
            .with_file_name(format!("{}.{}.tmp", SNAPSHOT_FILE, Uuid::new_v4().simple()));

        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;
        if let Err(err) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }

    /// Builds a whole replacement state from the current one, persists it,
    /// and only then makes it current.
    async fn replace<T>(
        &self,
        build: impl FnOnce(&StoreSnapshot) -> DbResult<(StoreSnapshot, T)>,
    ) -> DbResult<T> {
        let mut current = self.current.lock().await;
        let (next, out) = build(&*current)?;
        self.write(&next).await?;
        *current = next;
        Ok(out)
    }

    /// [`replace`](Self::replace) for changes made in place on a copy.
    async fn replace_with<T>(
        &self,
        change: impl FnOnce(&mut StoreSnapshot) -> DbResult<T>,
    ) -> DbResult<T> {
        self.replace(|current| {
            let mut next = current.clone();
            let out = change(&mut next)?;
            Ok((next, out))
        })
        .await
    }
}

impl CommitSink for SnapshotSink {
    async fn apply_checkout(&self, deltas: &[InventoryDelta], sales: &[SaleRecord]) -> SinkResult<()> {
        let result = self
            .replace(|current| {
                for delta in deltas {
                    if current.catalog.lookup(&delta.id).is_none() {
                        return Err(DbError::not_found("inventory", delta.id.as_str()));
                    }
                    if delta.new_qty < 0 {
                        return Err(DbError::CheckViolation(format!(
                            "qty for {} would be {}",
                            delta.id, delta.new_qty
                        )));
                    }
                }
                Ok((current.after_checkout(deltas, sales), ()))
            })
            .await;

        match result {
            Ok(()) => {
                info!(deltas = deltas.len(), sales = sales.len(), "Checkout snapshot written");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Checkout snapshot not written");
                Err(err.into_commit_failure())
            }
        }
    }

    async fn upsert_item(&self, item: &InventoryItem) -> SinkResult<()> {
        self.replace_with(|next| {
            next.catalog.upsert(item.clone());
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> SinkResult<()> {
        self.replace_with(|next| {
            next.catalog
                .delete(id)
                .map(|_| ())
                .ok_or_else(|| DbError::not_found("inventory", id.trim()))
        })
        .await?;
        Ok(())
    }

    async fn record_expense(&self, expense: &ExpenseRecord) -> SinkResult<()> {
        self.replace_with(|next| {
            // an edit keeps the stored date
            let mut expense = expense.clone();
            if let Some(existing) = next.find_expense(&expense.id) {
                expense.date = existing.date;
            }
            next.put_expense(expense);
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn delete_expense(&self, id: &str) -> SinkResult<()> {
        self.replace_with(|next| {
            next.take_expense(id)
                .map(|_| ())
                .ok_or_else(|| DbError::not_found("expense", id))
        })
        .await?;
        Ok(())
    }

    /// One write clears all three collections, so a failure clears none.
    async fn wipe_all(&self) -> SinkResult<WipeReport> {
        self.replace_with(|next| {
            let report = WipeReport {
                cleared: Collection::ALL
                    .iter()
                    .map(|c| (*c, next.count(*c) as u64))
                    .collect(),
            };
            *next = StoreSnapshot::default();
            Ok(report)
        })
        .await
        .map_err(|err| SinkError::ResetFailed {
            cleared: Vec::new(),
            failed: Collection::Inventory,
            reason: err.to_string(),
        })
    }
}

impl DataFeed for SnapshotSink {
    async fn load(&self) -> SinkResult<StoreSnapshot> {
        Ok(self.current.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("sari-snapshot-{}", Uuid::new_v4()))
            .join(SNAPSHOT_FILE)
    }

    fn item(id: &str, qty: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            cost_centavos: 0,
            price_centavos: 1000,
            qty,
        }
    }

    fn sale(id: &str) -> SaleRecord {
        SaleRecord {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            item_name: "Item 111".to_string(),
            selling_price_centavos: 1000,
            capital_price_centavos: 0,
            qty_sold: 2,
            total_centavos: 2000,
            profit_centavos: 2000,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_checkout_survives_reopen() {
        let path = temp_path();
        let sink = SnapshotSink::open(&path).await.unwrap();
        sink.upsert_item(&item("111", 5)).await.unwrap();
        sink.apply_checkout(
            &[InventoryDelta {
                id: "111".to_string(),
                new_qty: 3,
            }],
            &[sale("s1")],
        )
        .await
        .unwrap();

        let reopened = SnapshotSink::open(&path).await.unwrap();
        let snapshot = reopened.load().await.unwrap();
        assert_eq!(snapshot.catalog.lookup("111").unwrap().qty, 3);
        assert_eq!(snapshot.sales.len(), 1);
        assert_eq!(snapshot, sink.load().await.unwrap());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_writes_leave_no_temp_files_behind() {
        let path = temp_path();
        let sink = SnapshotSink::open(&path).await.unwrap();
        sink.upsert_item(&item("111", 5)).await.unwrap();
        sink.upsert_item(&item("222", 7)).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![SNAPSHOT_FILE.to_string()]);

        let on_disk: StoreSnapshot = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.catalog.len(), 2);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_unknown_item_rejects_whole_checkout() {
        let path = temp_path();
        let sink = SnapshotSink::open(&path).await.unwrap();
        sink.upsert_item(&item("111", 5)).await.unwrap();
        let before = sink.load().await.unwrap();

        let err = sink
            .apply_checkout(
                &[
                    InventoryDelta {
                        id: "111".to_string(),
                        new_qty: 3,
                    },
                    InventoryDelta {
                        id: "gone".to_string(),
                        new_qty: 0,
                    },
                ],
                &[sale("s1")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SinkError::CommitFailed(_)));
        assert_eq!(sink.load().await.unwrap(), before);
        assert_eq!(SnapshotSink::open(&path).await.unwrap().load().await.unwrap(), before);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_unwritable_location_leaves_state_unchanged() {
        // a regular file where the data directory should be
        let blocker = std::env::temp_dir().join(format!("sari-blocker-{}", Uuid::new_v4()));
        std::fs::write(&blocker, b"not a directory").unwrap();

        let sink = SnapshotSink::open(blocker.join(SNAPSHOT_FILE)).await.unwrap();
        assert!(sink.upsert_item(&item("111", 5)).await.is_err());
        assert!(matches!(
            sink.wipe_all().await,
            Err(SinkError::ResetFailed { .. })
        ));
        assert_eq!(sink.load().await.unwrap(), StoreSnapshot::default());

        let _ = std::fs::remove_file(&blocker);
    }

    #[tokio::test]
    async fn test_expense_edit_keeps_date_and_wipe_reports_counts() {
        let path = temp_path();
        let sink = SnapshotSink::open(&path).await.unwrap();
        let original = ExpenseRecord {
            id: "e1".to_string(),
            title: "Tubig".to_string(),
            amount_centavos: 25000,
            date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        };
        sink.record_expense(&original).await.unwrap();

        let mut edited = original.clone();
        edited.amount_centavos = 30000;
        edited.date = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        sink.record_expense(&edited).await.unwrap();

        let stored = sink.load().await.unwrap().expenses;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount_centavos, 30000);
        assert_eq!(stored[0].date, original.date);

        sink.upsert_item(&item("111", 1)).await.unwrap();
        let report = sink.wipe_all().await.unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(sink.load().await.unwrap(), StoreSnapshot::default());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
