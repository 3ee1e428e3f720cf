//! # Checkout Engine: Commit
//!
//! Turns a reviewed cart into one atomic commit: absolute inventory
//! quantities plus one sale record per cart line.
//!
//! ## Commit Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         process_checkout                                │
//! │                                                                         │
//! │  Cart + Catalog snapshot + discount                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  plan_checkout()        pure: validate, derive deltas and sales        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  sink.apply_checkout()  ONE atomic unit                                │
//! │        │                                                                │
//! │    ┌───┴──────────────┐                                                 │
//! │    Ok                 Err                                               │
//! │    │                  │                                                 │
//! │    ▼                  ▼                                                 │
//! │  snapshot updated   snapshot, cart, discount untouched                  │
//! │  cart cleared       CoreError::CommitFailed (retry is safe)             │
//! │  discount = 0                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount Apportionment
//! A cart-level discount is split **evenly by line count**, not by line
//! value. Leftover centavos go to the earliest lines so the line totals
//! always add up to the grand total.
//!
//! ```text
//! discount ₱10.00 over 3 lines → ₱3.34, ₱3.33, ₱3.33
//! ```

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::sink::{CommitSink, InventoryDelta};
use crate::store::StoreSnapshot;
use crate::types::SaleRecord;

/// When a checkout happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleStamp {
    /// Business date, the register's local calendar day.
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl SaleStamp {
    pub fn now() -> Self {
        SaleStamp {
            date: Local::now().date_naive(),
            created_at: Utc::now(),
        }
    }

    /// A stamp on a fixed business date.
    pub fn on(date: NaiveDate) -> Self {
        SaleStamp {
            date,
            created_at: Utc::now(),
        }
    }
}

/// Everything one checkout writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPlan {
    pub deltas: Vec<InventoryDelta>,
    pub sales: Vec<SaleRecord>,
    pub subtotal: Money,
    pub discount: Money,
    pub grand_total: Money,
}

impl CheckoutPlan {
    /// Sum of the profit of every sale in the plan.
    pub fn profit(&self) -> Money {
        self.sales.iter().map(|s| s.profit()).sum()
    }
}

/// Validates the cart against `catalog` and derives the commit.
///
/// ## Checks
/// - The cart is not empty
/// - Every line's item still exists in the catalog
/// - Every line's quantity fits the catalog's current `qty`
/// - `0 <= discount <= subtotal`
///
/// Nothing is mutated; a failed plan leaves everything as it was.
pub fn plan_checkout(cart: &Cart, catalog: &Catalog, discount: Money, stamp: SaleStamp) -> CoreResult<CheckoutPlan> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let subtotal = cart.subtotal();
    let grand_total = cart.grand_total(discount)?;
    let shares = discount.split_evenly(cart.line_count());

    let mut deltas = Vec::with_capacity(cart.line_count());
    let mut sales = Vec::with_capacity(cart.line_count());

    for (line, share) in cart.lines().iter().zip(shares) {
        let current = catalog
            .lookup(line.id())
            .ok_or_else(|| CoreError::ItemNotFound(line.id().trim().to_string()))?;

        let wanted = cart.quantity_of(line.id());
        if wanted > current.qty {
            return Err(CoreError::InsufficientStock {
                barcode: current.id.clone(),
                name: current.name.clone(),
                available: current.qty,
                requested: wanted,
            });
        }

        deltas.push(InventoryDelta {
            id: current.id.clone(),
            new_qty: current.qty - line.cart_qty,
        });

        sales.push(SaleRecord {
            id: Uuid::new_v4().to_string(),
            date: stamp.date,
            item_name: line.item.name.clone(),
            selling_price_centavos: line.item.price_centavos,
            capital_price_centavos: line.item.cost_centavos,
            qty_sold: line.cart_qty,
            total_centavos: (line.subtotal - share).centavos(),
            profit_centavos: (line.gross_profit() - share).centavos(),
            created_at: stamp.created_at,
        });
    }

    Ok(CheckoutPlan {
        deltas,
        sales,
        subtotal,
        discount,
        grand_total,
    })
}

/// Plans, commits and, only after the sink confirms, applies a checkout.
///
/// ## On failure
/// `cart`, `discount` and `store` are exactly as they were before the call.
/// The caller reports the error and may retry.
pub async fn process_checkout<S: CommitSink>(
    cart: &mut Cart,
    discount: &mut Money,
    store: &mut StoreSnapshot,
    sink: &S,
    stamp: SaleStamp,
) -> CoreResult<CheckoutPlan> {
    let plan = plan_checkout(cart, &store.catalog, *discount, stamp)?;

    if let Err(err) = sink.apply_checkout(&plan.deltas, &plan.sales).await {
        error!(lines = plan.sales.len(), error = %err, "Checkout commit rejected");
        return Err(err.into());
    }

    store.apply_checkout(&plan.deltas, &plan.sales);
    cart.clear();
    *discount = Money::zero();

    info!(
        lines = plan.sales.len(),
        total = %plan.grand_total,
        discount = %plan.discount,
        "Checkout committed"
    );

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{item, RecordingSink};

    fn stamp() -> SaleStamp {
        SaleStamp::on(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap())
    }

    fn store() -> StoreSnapshot {
        StoreSnapshot::new(
            Catalog::from_items(vec![item("A", 30, 50, 10), item("B", 8, 10, 3)]),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_financial_derivation_single_line() {
        let store = store();
        let mut cart = Cart::new();
        cart.add_or_merge(store.catalog.lookup("A").unwrap(), 4).unwrap();

        let plan = plan_checkout(&cart, &store.catalog, Money::zero(), stamp()).unwrap();
        assert_eq!(plan.subtotal, Money::from_pesos(200));
        assert_eq!(plan.sales[0].total(), Money::from_pesos(200));
        assert_eq!(plan.sales[0].profit(), Money::from_pesos(80));

        let plan = plan_checkout(&cart, &store.catalog, Money::from_pesos(20), stamp()).unwrap();
        assert_eq!(plan.grand_total, Money::from_pesos(180));
        assert_eq!(plan.sales[0].total(), Money::from_pesos(180));
        assert_eq!(plan.sales[0].profit(), Money::from_pesos(60));
        assert_eq!(plan.sales[0].date, stamp().date);
        assert_eq!(plan.sales[0].item_name, "Item A");
    }

    #[test]
    fn test_discount_split_by_line_count_not_value() {
        let store = store();
        let mut cart = Cart::new();
        cart.add_or_merge(store.catalog.lookup("A").unwrap(), 4).unwrap(); // 200
        cart.add_or_merge(store.catalog.lookup("B").unwrap(), 1).unwrap(); // 10

        let plan = plan_checkout(&cart, &store.catalog, Money::from_centavos(1001), stamp()).unwrap();
        let totals: Vec<i64> = plan.sales.iter().map(|s| s.total_centavos).collect();
        assert_eq!(totals, vec![20000 - 501, 1000 - 500]);
        assert_eq!(
            plan.sales.iter().map(|s| s.total()).sum::<Money>(),
            plan.grand_total
        );
    }

    #[test]
    fn test_deltas_are_absolute_quantities() {
        let store = store();
        let mut cart = Cart::new();
        cart.add_or_merge(store.catalog.lookup("A").unwrap(), 2).unwrap();
        cart.add_or_merge(store.catalog.lookup("A").unwrap(), 1).unwrap();
        cart.add_or_merge(store.catalog.lookup("B").unwrap(), 3).unwrap();

        let plan = plan_checkout(&cart, &store.catalog, Money::zero(), stamp()).unwrap();
        assert_eq!(
            plan.deltas,
            vec![
                InventoryDelta {
                    id: "A".to_string(),
                    new_qty: 7
                },
                InventoryDelta {
                    id: "B".to_string(),
                    new_qty: 0
                },
            ]
        );
    }

    #[test]
    fn test_plan_rejects_empty_cart_and_bad_discount() {
        let store = store();
        assert!(matches!(
            plan_checkout(&Cart::new(), &store.catalog, Money::zero(), stamp()),
            Err(CoreError::EmptyCart)
        ));

        let mut cart = Cart::new();
        cart.add_or_merge(store.catalog.lookup("B").unwrap(), 1).unwrap();
        assert!(matches!(
            plan_checkout(&cart, &store.catalog, Money::from_pesos(11), stamp()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_plan_revalidates_against_current_catalog() {
        let mut store = store();
        let mut cart = Cart::new();
        cart.add_or_merge(store.catalog.lookup("B").unwrap(), 3).unwrap();

        // stock edited down to 2 after the scan
        let mut edited = store.catalog.lookup("B").unwrap().clone();
        edited.qty = 2;
        store.catalog.upsert(edited);
        assert!(matches!(
            plan_checkout(&cart, &store.catalog, Money::zero(), stamp()),
            Err(CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            })
        ));

        store.catalog.delete("B");
        assert!(matches!(
            plan_checkout(&cart, &store.catalog, Money::zero(), stamp()),
            Err(CoreError::ItemNotFound(id)) if id == "B"
        ));
    }

    #[tokio::test]
    async fn test_successful_checkout_conserves_stock() {
        let mut store = store();
        let sink = RecordingSink::default();
        let mut cart = Cart::new();
        let mut discount = Money::from_pesos(5);
        cart.add_or_merge(store.catalog.lookup("A").unwrap(), 4).unwrap();
        cart.add_or_merge(store.catalog.lookup("B").unwrap(), 3).unwrap();

        let plan = process_checkout(&mut cart, &mut discount, &mut store, &sink, stamp())
            .await
            .unwrap();

        assert_eq!(store.catalog.lookup("A").unwrap().qty, 6);
        assert_eq!(store.catalog.lookup("B").unwrap().qty, 0);
        assert_eq!(store.sales, plan.sales);
        assert!(cart.is_empty());
        assert_eq!(discount, Money::zero());
        assert_eq!(sink.calls(), vec!["checkout 2 2"]);
    }

    #[tokio::test]
    async fn test_failed_commit_changes_nothing() {
        let mut store = store();
        let before = store.clone();
        let sink = RecordingSink::failing();
        let mut cart = Cart::new();
        let mut discount = Money::from_pesos(5);
        cart.add_or_merge(store.catalog.lookup("A").unwrap(), 4).unwrap();
        let cart_before = cart.clone();

        let err = process_checkout(&mut cart, &mut discount, &mut store, &sink, stamp())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::CommitFailed(_)));
        assert_eq!(store, before);
        assert_eq!(cart, cart_before);
        assert_eq!(discount, Money::from_pesos(5));
    }
}
