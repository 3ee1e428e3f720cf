//! # Catalog
//!
//! In-memory index of inventory records keyed by barcode.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Who mutates the catalog?                           │
//! │                                                                         │
//! │  ADD-mode save ────────► upsert()        full-field replace            │
//! │  Inventory screen ─────► delete()        no cascade to sales           │
//! │  Checkout commit ──────► apply_deltas()  absolute newQty per item      │
//! │                                                                         │
//! │  Nobody else. The cart only ever holds snapshots.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records keep the order they were loaded or inserted in, which is the order
//! the inventory screen lists them.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sink::InventoryDelta;
use crate::types::InventoryItem;

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// The authoritative current-state table of inventory items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<InventoryItem>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog { items: Vec::new() }
    }

    /// Builds a catalog from records pulled from storage.
    ///
    /// Stored ids are trimmed; if two stored ids collapse to the same barcode
    /// the later record wins.
    pub fn from_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let mut catalog = Catalog::new();
        for item in items {
            catalog.upsert(item);
        }
        catalog
    }

    /// Exact match on the trimmed barcode.
    ///
    /// Both sides are trimmed so scanner noise never causes a miss.
    pub fn lookup(&self, barcode: &str) -> Option<&InventoryItem> {
        let barcode = barcode.trim();
        self.items.iter().find(|i| i.id.trim() == barcode)
    }

    fn position(&self, barcode: &str) -> Option<usize> {
        let barcode = barcode.trim();
        self.items.iter().position(|i| i.id.trim() == barcode)
    }

    /// Inserts the item, or replaces every field of the existing record.
    ///
    /// ## Lost updates
    /// There is no field-level merge: a form opened before a checkout and
    /// saved after it writes back the stale `qty`. Callers that care compare
    /// against [`Catalog::lookup`] before saving.
    pub fn upsert(&mut self, mut item: InventoryItem) -> UpsertOutcome {
        item.id = item.id.trim().to_string();

        match self.position(&item.id) {
            Some(idx) => {
                debug!(barcode = %item.id, "Replacing catalog item");
                self.items[idx] = item;
                UpsertOutcome::Replaced
            }
            None => {
                debug!(barcode = %item.id, "Inserting catalog item");
                self.items.push(item);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Removes the record. Historical sales keep their own snapshot.
    pub fn delete(&mut self, barcode: &str) -> Option<InventoryItem> {
        let idx = self.position(barcode)?;
        Some(self.items.remove(idx))
    }

    /// Sets the absolute post-checkout quantity of each item.
    ///
    /// Unknown barcodes are skipped with a warning; the checkout engine has
    /// already validated every delta against this catalog.
    pub fn apply_deltas(&mut self, deltas: &[InventoryDelta]) {
        for delta in deltas {
            match self.position(&delta.id) {
                Some(idx) => self.items[idx].qty = delta.new_qty,
                None => warn!(barcode = %delta.id, "Delta for unknown item skipped"),
            }
        }
    }

    /// All records in listing order.
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Case-insensitive name search for the inventory screen.
    pub fn search(&self, query: &str) -> Vec<&InventoryItem> {
        let query = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Items at or below the low-stock threshold.
    pub fn low_stock(&self) -> Vec<&InventoryItem> {
        self.items.iter().filter(|i| i.is_low_stock()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears every record (used after a factory reset).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_items(self) -> Vec<InventoryItem> {
        self.items
    }
}

/// Free-function form of the low-stock check.
#[inline]
pub fn is_low_stock(item: &InventoryItem) -> bool {
    item.is_low_stock()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, qty: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            cost_centavos: 3000,
            price_centavos: 5000,
            qty,
        }
    }

    #[test]
    fn test_lookup_trims_both_sides() {
        let catalog = Catalog::from_items(vec![item(" 111 ", "Coke Mismo", 10)]);

        assert_eq!(catalog.lookup("111").map(|i| i.name.as_str()), Some("Coke Mismo"));
        assert!(catalog.lookup("\n111\t").is_some());
        assert!(catalog.lookup("1111").is_none());
    }

    #[test]
    fn test_upsert_replaces_all_fields() {
        let mut catalog = Catalog::from_items(vec![item("111", "Coke Mismo", 10)]);

        let outcome = catalog.upsert(InventoryItem {
            id: "111".to_string(),
            name: "Coke Mismo 290ml".to_string(),
            cost_centavos: 0,
            price_centavos: 2000,
            qty: 3,
        });

        assert_eq!(outcome, UpsertOutcome::Replaced);
        assert_eq!(catalog.len(), 1);
        let saved = catalog.lookup("111").unwrap();
        assert_eq!(saved.name, "Coke Mismo 290ml");
        assert_eq!(saved.cost_centavos, 0);
        assert_eq!(saved.qty, 3);
    }

    #[test]
    fn test_upsert_inserts_unknown_barcode() {
        let mut catalog = Catalog::new();
        assert_eq!(catalog.upsert(item(" 222", "Skyflakes", 20)), UpsertOutcome::Inserted);
        assert_eq!(catalog.items()[0].id, "222");
    }

    #[test]
    fn test_delete() {
        let mut catalog = Catalog::from_items(vec![item("111", "A", 1), item("222", "B", 2)]);
        assert_eq!(catalog.delete("111").map(|i| i.name), Some("A".to_string()));
        assert!(catalog.delete("111").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_search_and_low_stock() {
        let catalog = Catalog::from_items(vec![
            item("1", "Lucky Me Beef", 3),
            item("2", "Lucky Me Chicken", 12),
            item("3", "Bear Brand", 5),
        ]);

        assert_eq!(catalog.search("lucky").len(), 2);
        assert_eq!(catalog.search("BEAR").len(), 1);

        let low: Vec<&str> = catalog.low_stock().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(low, vec!["1", "3"]);
        assert!(is_low_stock(&catalog.items()[0]));
    }

    #[test]
    fn test_apply_deltas() {
        let mut catalog = Catalog::from_items(vec![item("1", "A", 10)]);
        catalog.apply_deltas(&[
            InventoryDelta {
                id: "1".to_string(),
                new_qty: 7,
            },
            InventoryDelta {
                id: "missing".to_string(),
                new_qty: 0,
            },
        ]);
        assert_eq!(catalog.lookup("1").unwrap().qty, 7);
    }
}
