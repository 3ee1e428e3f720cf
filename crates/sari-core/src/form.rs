//! # Item Form
//!
//! The ADD-mode registration / edit form. Fields are kept as the raw text the
//! operator sees and types; [`ItemForm::into_item`] turns them into an
//! [`InventoryItem`].
//!
//! ```text
//! scan in ADD mode
//!      │
//!      ├── known barcode ───► ItemForm::edit(&item)      every field pre-filled
//!      │
//!      └── unknown barcode ─► ItemForm::register(code)   blank, qty "0"
//!                                   │
//!                                   ▼
//!                          into_item()  ──► full-field upsert
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::InventoryItem;
use crate::validation::{
    normalize_barcode, parse_optional_money, parse_stock_level, validate_required_text, ValidationResult,
};

/// Editable fields of an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemForm {
    pub barcode: String,
    pub name: String,
    pub cost: String,
    pub price: String,
    pub qty: String,
    /// Stock level shown when the form was opened; `None` for a new barcode.
    pub scanned_qty: Option<i64>,
}

impl ItemForm {
    /// Blank form for a barcode that is not in the catalog yet.
    pub fn register(barcode: &str) -> Self {
        ItemForm {
            barcode: barcode.trim().to_string(),
            name: String::new(),
            cost: String::new(),
            price: String::new(),
            qty: "0".to_string(),
            scanned_qty: None,
        }
    }

    /// Form pre-filled from the current record.
    pub fn edit(item: &InventoryItem) -> Self {
        ItemForm {
            barcode: item.id.trim().to_string(),
            name: item.name.clone(),
            cost: item.cost().to_decimal_string(),
            price: item.price().to_decimal_string(),
            qty: item.qty.to_string(),
            scanned_qty: Some(item.qty),
        }
    }

    pub fn is_new(&self) -> bool {
        self.scanned_qty.is_none()
    }

    /// Validates every field and builds the record to save.
    ///
    /// Blank cost and price are saved as zero. A blank quantity is zero.
    pub fn into_item(&self) -> ValidationResult<InventoryItem> {
        let id = normalize_barcode(&self.barcode)?;
        let name = validate_required_text("name", &self.name)?;
        let cost = parse_optional_money("cost", &self.cost)?;
        let price = parse_optional_money("price", &self.price)?;
        let qty = parse_stock_level(&self.qty)?;

        Ok(InventoryItem {
            id,
            name,
            cost_centavos: cost.centavos(),
            price_centavos: price.centavos(),
            qty,
        })
    }

    /// Sets one field by its name, as typed on the register (`name=...`).
    pub fn set(&mut self, field: &str, value: &str) -> ValidationResult<()> {
        let value = value.trim().to_string();
        match field.trim().to_lowercase().as_str() {
            "name" => self.name = value,
            "cost" | "capital" => self.cost = value,
            "price" => self.price = value,
            "qty" | "stock" => self.qty = value,
            other => {
                return Err(ValidationError::InvalidFormat {
                    field: other.to_string(),
                    reason: "expected one of name, cost, price, qty".to_string(),
                })
            }
        }
        Ok(())
    }
}
