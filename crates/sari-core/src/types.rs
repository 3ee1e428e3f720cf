//! # Domain Types
//!
//! Core domain types used throughout Sari POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │   SaleRecord    │   │  ExpenseRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (barcode)   │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  date           │   │  title          │       │
//! │  │  cost_centavos  │   │  item_name      │   │  amount         │       │
//! │  │  price_centavos │   │  total / profit │   │  date           │       │
//! │  │  qty            │   │  created_at     │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    ScanMode     │   │   TimeWindow    │   │   Collection    │       │
//! │  │  Check/Add/Sell │   │ Daily/Weekly/   │   │ Inventory/Sales │       │
//! │  │                 │   │ Monthly         │   │ /Expenses       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! The barcode *is* the inventory primary key; there is no separate SKU.
//! Sale and expense records get UUID v4 ids because they are created offline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Inventory Item
// =============================================================================

/// A product on the shelf, keyed by its barcode.
///
/// ## Invariants
/// - `qty` is never negative. Checkout validation enforces this, not storage.
/// - `cost_centavos` defaults to 0 when a record was saved without a cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryItem {
    /// Barcode, trimmed. Primary key across catalog and cart.
    pub id: String,

    /// Display name shown to the cashier and copied into sale records.
    pub name: String,

    /// Unit acquisition cost in centavos.
    #[serde(default)]
    pub cost_centavos: i64,

    /// Unit selling price in centavos.
    pub price_centavos: i64,

    /// Units on hand.
    pub qty: i64,
}

impl InventoryItem {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_centavos(self.price_centavos)
    }

    /// Returns the acquisition cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_centavos(self.cost_centavos)
    }

    /// Profit earned on one unit (price − cost).
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.price() - self.cost()
    }

    /// Low stock means `qty <= 5`. The threshold is fixed.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.qty <= LOW_STOCK_THRESHOLD
    }

    /// Nothing left to sell.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.qty <= 0
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One sold cart line.
///
/// Uses the snapshot pattern: name, selling price and capital price are
/// frozen at checkout so deleting or repricing the catalog item never changes
/// history. A multi-line checkout produces one record per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    /// Business date of the checkout.
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Item name at time of sale (frozen).
    pub item_name: String,
    /// Unit selling price at time of sale (frozen).
    pub selling_price_centavos: i64,
    /// Unit cost at time of sale (frozen).
    pub capital_price_centavos: i64,
    pub qty_sold: i64,
    /// selling price × qty, minus this line's share of the discount.
    pub total_centavos: i64,
    /// (selling − capital) × qty, minus this line's share of the discount.
    pub profit_centavos: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleRecord {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_centavos(self.selling_price_centavos)
    }

    #[inline]
    pub fn capital_price(&self) -> Money {
        Money::from_centavos(self.capital_price_centavos)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_centavos(self.total_centavos)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_centavos(self.profit_centavos)
    }

    /// Markup percentage `(selling − capital) / capital`, reporting only.
    /// `None` when the item was recorded without a cost.
    pub fn markup_pct(&self) -> Option<i64> {
        self.selling_price().markup_over(self.capital_price())
    }
}

// =============================================================================
// Expense Record
// =============================================================================

/// An operating expense (rent, electricity, restock transport...).
///
/// Created, edited and deleted directly by the operator; only read by the
/// ledger when computing net profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ExpenseRecord {
    pub id: String,
    pub title: String,
    pub amount_centavos: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl ExpenseRecord {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_centavos(self.amount_centavos)
    }
}

// =============================================================================
// Dated records
// =============================================================================

/// Anything the ledger can place on a calendar day.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for SaleRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for ExpenseRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

// =============================================================================
// Scan Mode
// =============================================================================

/// What a scan does.
///
/// ```text
/// CHECK ── price inquiry, no mutation
/// ADD ──── register a new barcode or edit an existing item
/// SELL ─── add the item to the cart
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMode {
    Check,
    Add,
    Sell,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Check => write!(f, "CHECK"),
            ScanMode::Add => write!(f, "ADD"),
            ScanMode::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "check" | "price" => Ok(ScanMode::Check),
            "add" | "stock" => Ok(ScanMode::Add),
            "sell" | "pos" => Ok(ScanMode::Sell),
            other => Err(ValidationError::InvalidFormat {
                field: "mode".to_string(),
                reason: format!("unknown mode '{}', expected check, add or sell", other),
            }),
        }
    }
}

// =============================================================================
// Time Window
// =============================================================================

/// A named, anchor-relative date range used for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeWindow {
    /// Exactly the anchor date.
    #[default]
    Daily,
    /// The anchor date and the six days before it.
    Weekly,
    /// The anchor's calendar month and year.
    Monthly,
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::Daily => write!(f, "DAILY"),
            TimeWindow::Weekly => write!(f, "WEEKLY"),
            TimeWindow::Monthly => write!(f, "MONTHLY"),
        }
    }
}

impl FromStr for TimeWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "today" => Ok(TimeWindow::Daily),
            "weekly" | "week" => Ok(TimeWindow::Weekly),
            "monthly" | "month" => Ok(TimeWindow::Monthly),
            other => Err(ValidationError::InvalidFormat {
                field: "window".to_string(),
                reason: format!("unknown window '{}', expected daily, weekly or monthly", other),
            }),
        }
    }
}

// =============================================================================
// Collection
// =============================================================================

/// The three persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Inventory,
    Sales,
    Expenses,
}

impl Collection {
    /// Wipe order: inventory first, then sales, then expenses.
    pub const ALL: [Collection; 3] = [Collection::Inventory, Collection::Sales, Collection::Expenses];

    /// Table / document collection name.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Inventory => "inventory",
            Collection::Sales => "sales",
            Collection::Expenses => "expenses",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i64) -> InventoryItem {
        InventoryItem {
            id: "4800016644290".to_string(),
            name: "Pancit Canton".to_string(),
            cost_centavos: 1200,
            price_centavos: 1500,
            qty,
        }
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        assert!(item(5).is_low_stock());
        assert!(item(0).is_low_stock());
        assert!(!item(6).is_low_stock());
    }

    #[test]
    fn test_unit_margin() {
        assert_eq!(item(1).unit_margin(), Money::from_centavos(300));
    }

    #[test]
    fn test_missing_cost_defaults_to_zero() {
        let json = r#"{"id":"123","name":"Candy","price_centavos":100,"qty":50}"#;
        let item: InventoryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.cost(), Money::zero());
    }

    #[test]
    fn test_sale_record_date_serializes_as_calendar_day() {
        let record = SaleRecord {
            id: "s1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            item_name: "Candy".to_string(),
            selling_price_centavos: 100,
            capital_price_centavos: 0,
            qty_sold: 1,
            total_centavos: 100,
            profit_centavos: 100,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2025-01-05");
        assert_eq!(record.markup_pct(), None);
    }

    #[test]
    fn test_parse_mode_and_window() {
        assert_eq!("SELL".parse::<ScanMode>().unwrap(), ScanMode::Sell);
        assert_eq!("check".parse::<ScanMode>().unwrap(), ScanMode::Check);
        assert!("refund".parse::<ScanMode>().is_err());

        assert_eq!("weekly".parse::<TimeWindow>().unwrap(), TimeWindow::Weekly);
        assert_eq!(TimeWindow::default(), TimeWindow::Daily);
        assert!("yearly".parse::<TimeWindow>().is_err());
    }
}
