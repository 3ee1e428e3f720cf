//! # sari-db: Persistence Layer for Sari POS
//!
//! This crate implements the persistence contracts that sari-core only
//! describes: [`sari_core::CommitSink`] for writes and
//! [`sari_core::DataFeed`] for the initial load.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Data Flow                               │
//! │                                                                         │
//! │  ScanSession::checkout / StoreSnapshot::save_item                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sari-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌───────────────┐   ┌──────────────┐   │   │
//! │  │   │     sink       │   │  Repositories │   │  Migrations  │   │   │
//! │  │   │                │   │               │   │  (embedded)  │   │   │
//! │  │   │ SqliteCommit   │──►│ Inventory     │   │              │   │   │
//! │  │   │   Sink (tx)    │   │ Sale          │   │ 001_initial  │   │   │
//! │  │   │ SnapshotSink   │   │ Expense       │   │              │   │   │
//! │  │   │   (one file)   │   └───────────────┘   └──────────────┘   │   │
//! │  │   └────────────────┘                                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │   sari.db (SQLite, WAL)             store.json                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Table access (inventory, sales, expenses)
//! - [`sink`] - The two commit strategies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sari_db::{Database, DbConfig, SqliteCommitSink};
//! use sari_core::DataFeed;
//!
//! let db = Database::new(DbConfig::new("path/to/sari.db")).await?;
//! let sink = SqliteCommitSink::new(db);
//! let store = sink.load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sink;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::expense::ExpenseRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::sale::SaleRepository;

pub use sink::snapshot::SNAPSHOT_FILE;
pub use sink::{SnapshotSink, SqliteCommitSink};
