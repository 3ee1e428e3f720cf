//! # Cart
//!
//! The in-progress, unpersisted set of items selected for one sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Scanner / keypad          Session                 Cart change          │
//! │  ────────────────          ───────                 ───────────          │
//! │                                                                         │
//! │  Scan + qty ─────────────► confirm_quantity() ───► add_or_merge()      │
//! │                                                                         │
//! │  Remove on review ───────► remove_line() ────────► remove(index)       │
//! │                                                                         │
//! │  Commit success / exit ──► ──────────────────────► clear()             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by item id (a repeat scan merges into the existing line)
//! - `cart_qty > 0`
//! - `cart_qty` never exceeds the `qty` of the snapshot it was validated
//!   against; a failed add leaves the cart untouched
//! - `subtotal == price × cart_qty` after every change

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::InventoryItem;
use crate::validation::{validate_discount, validate_quantity};

/// A line in the cart.
///
/// ## Snapshot
/// `item` is a frozen copy of the catalog record at scan time. Price and cost
/// are locked in when the item is scanned; a repricing in the catalog does not
/// change a line already in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item: InventoryItem,
    pub cart_qty: i64,
    pub subtotal: Money,
}

impl CartLine {
    fn new(item: &InventoryItem, cart_qty: i64) -> CoreResult<Self> {
        Ok(CartLine {
            item: item.clone(),
            cart_qty,
            subtotal: line_subtotal(item, cart_qty)?,
        })
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Profit on this line before any discount.
    pub fn gross_profit(&self) -> Money {
        self.item.unit_margin() * self.cart_qty
    }
}

/// The shopping cart for one checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds `requested_qty` of `item`, merging into an existing line.
    ///
    /// ## Stock gate
    /// The resulting line quantity is checked against `item.qty`, the
    /// snapshot handed in by the caller. Exceeding it is a hard failure, not
    /// a clamp:
    ///
    /// ```text
    /// stock = 5, cart holds 3, request 3
    ///      │
    ///      ▼
    /// 3 + 3 = 6 > 5 → InsufficientStock, cart still holds 3
    /// ```
    pub fn add_or_merge(&mut self, item: &InventoryItem, requested_qty: i64) -> CoreResult<&CartLine> {
        validate_quantity(requested_qty)?;

        let barcode = item.id.trim();
        if requested_qty > item.qty {
            return Err(insufficient(item, requested_qty));
        }

        let idx = match self.lines.iter().position(|l| l.item.id.trim() == barcode) {
            Some(idx) => {
                let line = &self.lines[idx];
                let new_qty = line
                    .cart_qty
                    .checked_add(requested_qty)
                    .filter(|q| *q <= item.qty)
                    .ok_or_else(|| insufficient(item, line.cart_qty.saturating_add(requested_qty)))?;
                let subtotal = line_subtotal(&line.item, new_qty)?;

                let line = &mut self.lines[idx];
                line.cart_qty = new_qty;
                line.subtotal = subtotal;
                debug!(barcode = %barcode, cart_qty = new_qty, "Merged cart line");
                idx
            }
            None => {
                self.lines.push(CartLine::new(item, requested_qty)?);
                debug!(barcode = %barcode, cart_qty = requested_qty, "Added cart line");
                self.lines.len() - 1
            }
        };

        Ok(&self.lines[idx])
    }

    /// Removes one whole line. There is no partial-quantity removal.
    pub fn remove(&mut self, line_index: usize) -> CoreResult<CartLine> {
        if line_index >= self.lines.len() {
            return Err(ValidationError::OutOfRange {
                field: "line".to_string(),
                min: 1,
                max: self.lines.len() as i64,
            }
            .into());
        }
        Ok(self.lines.remove(line_index))
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a barcode already in the cart (0 if absent).
    pub fn quantity_of(&self, barcode: &str) -> i64 {
        let barcode = barcode.trim();
        self.lines
            .iter()
            .filter(|l| l.item.id.trim() == barcode)
            .map(|l| l.cart_qty)
            .fold(0, i64::saturating_add)
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.cart_qty).fold(0, i64::saturating_add)
    }

    /// Sum of line subtotals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    /// Sum of line subtotals minus `discount`.
    ///
    /// A negative discount, or one larger than the subtotal, is rejected so
    /// the total never goes negative.
    pub fn grand_total(&self, discount: Money) -> CoreResult<Money> {
        let subtotal = self.subtotal();
        validate_discount(discount, subtotal)?;
        Ok(subtotal - discount)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn line_subtotal(item: &InventoryItem, cart_qty: i64) -> CoreResult<Money> {
    item.price().checked_mul(cart_qty).ok_or_else(|| {
        CoreError::from(ValidationError::OutOfRange {
            field: "subtotal".to_string(),
            min: 0,
            max: i64::MAX,
        })
    })
}

fn insufficient(item: &InventoryItem, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        barcode: item.id.trim().to_string(),
        name: item.name.clone(),
        available: item.qty,
        requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item(id: &str, price_pesos: i64, qty: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            cost_centavos: 0,
            price_centavos: price_pesos * 100,
            qty,
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        let item = test_item("1", 50, 10);

        let line = cart.add_or_merge(&item, 4).unwrap();
        assert_eq!(line.subtotal, Money::from_pesos(200));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_merge_equals_single_scan() {
        let item = test_item("1", 15, 10);

        let mut merged = Cart::new();
        merged.add_or_merge(&item, 2).unwrap();
        merged.add_or_merge(&item, 3).unwrap();

        let mut single = Cart::new();
        single.add_or_merge(&item, 5).unwrap();

        assert_eq!(merged.line_count(), 1);
        assert_eq!(merged.lines()[0].cart_qty, 5);
        assert_eq!(merged.lines()[0].subtotal, Money::from_pesos(75));
        assert_eq!(merged, single);
    }

    #[test]
    fn test_merge_over_stock_is_rejected_and_cart_unchanged() {
        let mut cart = Cart::new();
        let item = test_item("1", 10, 5);

        cart.add_or_merge(&item, 3).unwrap();
        let before = cart.clone();

        let err = cart.add_or_merge(&item, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.lines()[0].cart_qty, 3);
    }

    #[test]
    fn test_new_line_over_stock_is_rejected() {
        let mut cart = Cart::new();
        let err = cart.add_or_merge(&test_item("1", 10, 2), 3).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_invalid_quantity() {
        let mut cart = Cart::new();
        let item = test_item("1", 10, 5);
        assert!(matches!(
            cart.add_or_merge(&item, 0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            cart.add_or_merge(&item, -2),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_scanner_noise_merges_into_same_line() {
        let mut cart = Cart::new();
        cart.add_or_merge(&test_item("111", 10, 5), 1).unwrap();
        cart.add_or_merge(&test_item(" 111 ", 10, 5), 1).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("111"), 2);
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        cart.add_or_merge(&test_item("1", 10, 5), 1).unwrap();
        cart.add_or_merge(&test_item("2", 20, 5), 2).unwrap();

        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.id(), "1");
        assert_eq!(cart.line_count(), 1);
        assert!(cart.remove(5).is_err());
    }

    #[test]
    fn test_grand_total_with_discount() {
        let mut cart = Cart::new();
        cart.add_or_merge(&test_item("1", 50, 10), 4).unwrap();

        assert_eq!(cart.grand_total(Money::zero()).unwrap(), Money::from_pesos(200));
        assert_eq!(cart.grand_total(Money::from_pesos(20)).unwrap(), Money::from_pesos(180));
        assert!(cart.grand_total(Money::from_pesos(-1)).is_err());
        assert!(cart.grand_total(Money::from_pesos(201)).is_err());
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        cart.add_or_merge(&test_item("1", 10, 5), 2).unwrap();
        assert_eq!(cart.subtotal(), Money::from_pesos(20));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_merge_of_huge_quantity_is_rejected() {
        let mut cart = Cart::new();
        let item = test_item("1", 10, 10);
        cart.add_or_merge(&item, 1).unwrap();
        let before = cart.clone();

        let err = cart.add_or_merge(&item, i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 10,
                requested: i64::MAX,
                ..
            }
        ));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_merge_overflow_with_unbounded_stock_is_rejected() {
        let mut cart = Cart::new();
        let item = test_item("1", 0, i64::MAX);
        cart.add_or_merge(&item, i64::MAX - 1).unwrap();

        assert!(matches!(
            cart.add_or_merge(&item, 2),
            Err(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(cart.lines()[0].cart_qty, i64::MAX - 1);
        assert!(cart.lines().iter().all(|l| l.cart_qty > 0));
    }

    #[test]
    fn test_line_subtotal_overflow_is_rejected() {
        let mut cart = Cart::new();
        let mut item = test_item("1", 0, i64::MAX);
        item.price_centavos = i64::MAX / 2;

        assert!(matches!(
            cart.add_or_merge(&item, 3),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(cart.is_empty());
    }
}
