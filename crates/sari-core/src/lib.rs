//! # sari-core: Consistency Engine for Sari POS
//!
//! This crate is the **heart** of Sari POS. It turns barcode scans into a
//! cart, and a cart into one atomic commit of inventory decrements plus sale
//! records. It performs no I/O of its own: persistence is reached only
//! through the [`sink::CommitSink`] and [`sink::DataFeed`] traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Register (apps/register)                     │   │
//! │  │    scanner input ──► commands ──► prompts / reports             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sari-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │   cart    │  │  session  │  │  ledger   │  │   │
//! │  │   │  lookup   │  │  merge    │  │  checkout │  │  windows  │  │   │
//! │  │   │  upsert   │  │  totals   │  │  commit   │  │  summary  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   CommitSink / DataFeed traits (no implementations here)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    sari-db (Persistence)                        │   │
//! │  │       SqliteCommitSink (transactional), SnapshotSink (file)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (InventoryItem, SaleRecord, ExpenseRecord)
//! - [`money`] - Money in centavos (no floating point)
//! - [`catalog`] - Barcode-keyed inventory index
//! - [`cart`] - Cart with merge-on-rescan and the stock gate
//! - [`session`] - Scanner state machine (CHECK / ADD / SELL)
//! - [`checkout`] - Commit planning and the atomic commit
//! - [`ledger`] - Window filters, summaries, fast movers, reports
//! - [`store`] - The snapshot every operation runs against
//! - [`sink`] - Persistence contracts
//!
//! ## Example Usage
//!
//! ```rust
//! use sari_core::cart::Cart;
//! use sari_core::money::Money;
//! use sari_core::types::InventoryItem;
//!
//! let item = InventoryItem {
//!     id: "4800016644290".to_string(),
//!     name: "Pancit Canton".to_string(),
//!     cost_centavos: 1200,
//!     price_centavos: 1500,
//!     qty: 10,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_or_merge(&item, 2).unwrap();
//! cart.add_or_merge(&item, 1).unwrap();
//!
//! assert_eq!(cart.line_count(), 1);
//! assert_eq!(cart.subtotal(), Money::from_pesos(45));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod expense;
pub mod form;
pub mod ledger;
pub mod money;
pub mod session;
pub mod sink;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use catalog::Catalog;
pub use checkout::{CheckoutPlan, SaleStamp};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::{ScanOutcome, ScanSession, SessionState};
pub use sink::{CommitSink, DataFeed, InventoryDelta, SinkError, SinkResult, WipeReport};
pub use store::StoreSnapshot;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Items at or below this many units are flagged as low stock.
///
/// Fixed, not configurable.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// How many fast-moving items the dashboard lists by default.
pub const DEFAULT_FAST_MOVING_LIMIT: usize = 5;

/// Bounds for a configured fast-moving list length.
pub const FAST_MOVING_LIMIT_RANGE: std::ops::RangeInclusive<usize> = 3..=5;
