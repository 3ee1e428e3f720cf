//! # Register State
//!
//! Everything one running register holds between commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    RegisterState<S>                                     │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │ config       │ │ session      │ │ store        │ │ sink         │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │ store name   │ │ mode, state  │ │ catalog      │ │ CommitSink + │   │
//! │  │ reset PIN    │ │ cart,        │ │ sales        │ │ DataFeed     │   │
//! │  │ fast movers  │ │ discount     │ │ expenses     │ │              │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  Commands run one at a time on the input loop, so plain `&mut self`    │
//! │  is enough; there is no shared state between tasks.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod config;

pub use backend::Backend;
pub use config::{BackendKind, RegisterConfig};

use sari_core::{CommitSink, DataFeed, ScanSession, StoreSnapshot};
use tracing::{debug, warn};

use crate::error::RegisterResult;

/// The running register.
#[derive(Debug)]
pub struct RegisterState<S> {
    pub config: RegisterConfig,
    pub session: ScanSession,
    pub store: StoreSnapshot,
    pub sink: S,
}

impl<S: CommitSink + DataFeed> RegisterState<S> {
    /// Loads the current store from `sink`. The session starts idle in SELL.
    pub async fn open(config: RegisterConfig, sink: S) -> RegisterResult<Self> {
        let store = sink.load().await?;
        Ok(RegisterState {
            config,
            session: ScanSession::default(),
            store,
            sink,
        })
    }

    /// Pulls the store again after a persisted change.
    ///
    /// The change is already applied locally, so a failed reload only logs.
    pub async fn refresh(&mut self) {
        match self.sink.load().await {
            Ok(store) => {
                debug!(items = store.catalog.len(), sales = store.sales.len(), "Store reloaded");
                self.store = store;
            }
            Err(err) => warn!(error = %err, "Reload failed, keeping local state"),
        }
    }
}
