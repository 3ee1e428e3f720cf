//! # Inventory Commands
//!
//! The inventory screen: list or search items, flag low stock, delete.

use sari_core::{CommitSink, DataFeed, InventoryItem, LOW_STOCK_THRESHOLD};
use std::fmt::Write;

use crate::commands::scan::stock_flag;
use crate::error::RegisterResult;
use crate::state::{RegisterConfig, RegisterState};

/// All items, or those whose name contains `query` (case-insensitive).
pub fn list<S>(state: &RegisterState<S>, query: Option<&str>) -> RegisterResult<String> {
    let items: Vec<&InventoryItem> = match query {
        Some(query) => state.store.catalog.search(query),
        None => state.store.catalog.items().iter().collect(),
    };
    if items.is_empty() {
        return Ok(match query {
            Some(query) => format!("No items match '{}'", query),
            None => "Inventory is empty".to_string(),
        });
    }
    Ok(render(&state.config, &items))
}

pub fn low<S>(state: &RegisterState<S>) -> RegisterResult<String> {
    let items = state.store.catalog.low_stock();
    if items.is_empty() {
        return Ok(format!("No items at or below {} units", LOW_STOCK_THRESHOLD));
    }
    Ok(render(&state.config, &items))
}

/// Deletes the record. Past sales keep their own copy of name and prices.
pub async fn delete<S: CommitSink + DataFeed>(state: &mut RegisterState<S>, barcode: &str) -> RegisterResult<String> {
    let removed = state.store.delete_item(&state.sink, barcode).await?;
    state.refresh().await;
    Ok(format!("Deleted {} ({})", removed.name, removed.id))
}

/// ```text
/// 4800016644290  Pancit Canton         price ₱15.00  cost ₱12.00  margin ₱3.00  qty 2  LOW
/// ```
fn render(config: &RegisterConfig, items: &[&InventoryItem]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{:<14} {:<20} price {:>9}  cost {:>9}  margin {:>9}  qty {:>4}{}",
            item.id,
            item.name,
            config.format_money(item.price()),
            config.format_money(item.cost()),
            config.format_money(item.unit_margin()),
            item.qty,
            stock_flag(item)
        );
    }
    let _ = write!(out, "{} item(s)", items.len());
    out
}

#[cfg(test)]
mod tests {
    use crate::commands::tests::{register, run};
    use crate::error::ErrorCode;
    use sari_core::DataFeed;

    #[tokio::test]
    async fn test_search_and_low_stock() {
        let (mut state, dir) = register().await;

        let all = run(&mut state, "inventory").await.unwrap();
        assert!(all.ends_with("2 item(s)"));

        let found = run(&mut state, "inv canton").await.unwrap();
        assert!(found.contains("Pancit Canton"));
        assert!(found.contains("₱3.00"));
        assert!(!found.contains("Kape"));
        assert_eq!(run(&mut state, "inv sardinas").await.unwrap(), "No items match 'sardinas'");

        // both seeded items are at or below five units
        assert!(run(&mut state, "low").await.unwrap().ends_with("2 item(s)"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_delete_item() {
        let (mut state, dir) = register().await;

        assert_eq!(run(&mut state, "delete 222").await.unwrap(), "Deleted Pancit Canton (222)");
        assert!(state.sink.load().await.unwrap().catalog.lookup("222").is_none());
        assert!(state.store.catalog.lookup("222").is_none());

        let err = run(&mut state, "delete 222").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let _ = std::fs::remove_dir_all(dir);
    }
}
