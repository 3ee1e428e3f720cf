//! # Commit Sinks
//!
//! The two persistence strategies behind [`sari_core::CommitSink`].
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────────┐
//! │ Strategy                 │ Checkout write                               │
//! ├──────────────────────────┼──────────────────────────────────────────────┤
//! │ SqliteCommitSink         │ BEGIN; UPDATE qty…; INSERT sale…; COMMIT     │
//! │ (transactional)          │ any failure → ROLLBACK, nothing visible      │
//! ├──────────────────────────┼──────────────────────────────────────────────┤
//! │ SnapshotSink             │ whole post-checkout state → temp file →      │
//! │ (optimistic-local)       │ rename over store.json (one write)           │
//! └──────────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Both also implement [`sari_core::DataFeed`] so the register can pull the
//! current state from whichever one it was configured with.

pub mod snapshot;
pub mod transactional;

pub use snapshot::SnapshotSink;
pub use transactional::SqliteCommitSink;
