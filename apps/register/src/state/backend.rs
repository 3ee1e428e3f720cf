//! # Storage Backend
//!
//! The register picks one commit strategy at startup and talks to it through
//! the sink traits only.
//!
//! ```text
//! RegisterConfig.backend
//!        │
//!        ├── sqlite   ──► Database::new(data_dir/sari.db) ──► SqliteCommitSink
//!        │
//!        └── snapshot ──► SnapshotSink::open(data_dir/store.json)
//! ```

use sari_core::{
    CommitSink, DataFeed, ExpenseRecord, InventoryDelta, InventoryItem, SaleRecord, SinkResult, StoreSnapshot,
    WipeReport,
};
use sari_db::{Database, DbConfig, SnapshotSink, SqliteCommitSink, SNAPSHOT_FILE};
use tracing::info;

use crate::error::{RegisterError, RegisterResult};
use crate::state::config::{BackendKind, RegisterConfig};

/// SQLite file name inside the data directory.
pub const DATABASE_FILE: &str = "sari.db";

/// One of the two commit strategies.
#[derive(Debug)]
pub enum Backend {
    Sqlite(SqliteCommitSink),
    Snapshot(SnapshotSink),
}

impl Backend {
    /// Opens the configured backend, creating the data directory if needed.
    pub async fn open(config: &RegisterConfig) -> RegisterResult<Self> {
        let dir = config.resolve_data_dir()?;
        std::fs::create_dir_all(&dir)
            .map_err(|e| RegisterError::storage(format!("cannot create {}: {}", dir.display(), e)))?;

        let backend = match config.backend {
            BackendKind::Sqlite => {
                let path = dir.join(DATABASE_FILE);
                info!(path = %path.display(), "Opening SQLite store");
                let db = Database::new(DbConfig::new(path)).await?;
                Backend::Sqlite(SqliteCommitSink::new(db))
            }
            BackendKind::Snapshot => {
                let path = dir.join(SNAPSHOT_FILE);
                info!(path = %path.display(), "Opening snapshot store");
                Backend::Snapshot(SnapshotSink::open(path).await?)
            }
        };
        Ok(backend)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Sqlite(_) => BackendKind::Sqlite,
            Backend::Snapshot(_) => BackendKind::Snapshot,
        }
    }

    /// Releases the pool; the snapshot file needs no shutdown.
    pub async fn close(&self) {
        if let Backend::Sqlite(sink) = self {
            sink.database().close().await;
        }
    }
}

impl CommitSink for Backend {
    async fn apply_checkout(&self, deltas: &[InventoryDelta], sales: &[SaleRecord]) -> SinkResult<()> {
        match self {
            Backend::Sqlite(sink) => sink.apply_checkout(deltas, sales).await,
            Backend::Snapshot(sink) => sink.apply_checkout(deltas, sales).await,
        }
    }

    async fn upsert_item(&self, item: &InventoryItem) -> SinkResult<()> {
        match self {
            Backend::Sqlite(sink) => sink.upsert_item(item).await,
            Backend::Snapshot(sink) => sink.upsert_item(item).await,
        }
    }

    async fn delete_item(&self, id: &str) -> SinkResult<()> {
        match self {
            Backend::Sqlite(sink) => sink.delete_item(id).await,
            Backend::Snapshot(sink) => sink.delete_item(id).await,
        }
    }

    async fn record_expense(&self, expense: &ExpenseRecord) -> SinkResult<()> {
        match self {
            Backend::Sqlite(sink) => sink.record_expense(expense).await,
            Backend::Snapshot(sink) => sink.record_expense(expense).await,
        }
    }

    async fn delete_expense(&self, id: &str) -> SinkResult<()> {
        match self {
            Backend::Sqlite(sink) => sink.delete_expense(id).await,
            Backend::Snapshot(sink) => sink.delete_expense(id).await,
        }
    }

    async fn wipe_all(&self) -> SinkResult<WipeReport> {
        match self {
            Backend::Sqlite(sink) => sink.wipe_all().await,
            Backend::Snapshot(sink) => sink.wipe_all().await,
        }
    }
}

impl DataFeed for Backend {
    async fn load(&self) -> SinkResult<StoreSnapshot> {
        match self {
            Backend::Sqlite(sink) => sink.load().await,
            Backend::Snapshot(sink) => sink.load().await,
        }
    }
}
