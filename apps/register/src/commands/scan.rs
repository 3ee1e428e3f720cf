//! # Scanner Commands
//!
//! Drive the scan session: pick a mode, scan, answer the modal that opens.
//!
//! ```text
//!   SELL:  <barcode> ──► "how many?" ──► qty 3 ──► line in cart
//!   CHECK: <barcode> ──► price + stock ──► ack
//!   ADD:   <barcode> ──► item form ──► set price 15 ──► save
//! ```

use sari_core::catalog::UpsertOutcome;
use sari_core::form::ItemForm;
use sari_core::validation::parse_quantity;
use sari_core::{CommitSink, CoreError, DataFeed, InventoryItem, ScanMode, ScanOutcome, SessionState};
use tracing::info;

use crate::error::{ErrorCode, RegisterError, RegisterResult};
use crate::state::RegisterState;

pub fn open<S>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    state.session.open();
    Ok(format!("Scanner ready in {} mode", state.session.mode()))
}

pub fn mode<S>(state: &mut RegisterState<S>, mode: ScanMode) -> RegisterResult<String> {
    state.session.set_mode(mode)?;
    state.session.open();
    Ok(format!("{} mode", mode))
}

pub fn scan<S>(state: &mut RegisterState<S>, raw: &str) -> RegisterResult<String> {
    if state.session.state() == SessionState::Idle {
        return Err(RegisterError::new(
            ErrorCode::InvalidState,
            "Scanner is closed; type `open` first",
        ));
    }

    let outcome = state.session.handle_scan(raw, &state.store)?;
    let config = &state.config;
    let text = match outcome {
        ScanOutcome::PriceCheck(item) => format!(
            "{}  {}  stock {}{}\n(ack to continue)",
            item.name,
            config.format_money(item.price()),
            item.qty,
            stock_flag(&item)
        ),
        ScanOutcome::EditForm(form) => format!("Editing {}\n{}", form.barcode, render_form(&form)),
        ScanOutcome::RegisterForm(form) => format!("New barcode {}\n{}", form.barcode, render_form(&form)),
        ScanOutcome::QuantityPrompt { item, in_cart } => format!(
            "{}  {}  ({} available)\nqty <n>",
            item.name,
            config.format_money(item.price()),
            item.qty - in_cart
        ),
        ScanOutcome::Suppressed(modal) => format!("Scan ignored while {}", modal),
    };
    Ok(text)
}

pub fn qty<S>(state: &mut RegisterState<S>, input: &str) -> RegisterResult<String> {
    let qty = parse_quantity(input)?;
    let line = state.session.confirm_quantity(qty)?;
    let cart = state.session.cart();
    Ok(format!(
        "Added {} × {} (now {} in cart)\nCart: {} line(s), subtotal {}",
        qty,
        line.item.name,
        line.cart_qty,
        cart.line_count(),
        state.config.format_money(cart.subtotal())
    ))
}

pub fn ack<S>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    state.session.acknowledge()?;
    Ok("Ready".to_string())
}

pub fn set<S>(state: &mut RegisterState<S>, field: &str, value: &str) -> RegisterResult<String> {
    let current = state.session.state();
    let form = state.session.form_mut().ok_or_else(|| {
        RegisterError::from(CoreError::invalid_state("edit the item form", current))
    })?;
    form.set(field, value)?;
    Ok(render_form(form))
}

pub async fn save<S: CommitSink + DataFeed>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    let (item, outcome) = state.session.save_item(&mut state.store, &state.sink).await?;
    state.refresh().await;

    let verb = match outcome {
        UpsertOutcome::Inserted => "Registered",
        UpsertOutcome::Replaced => "Updated",
    };
    Ok(format!(
        "{} {} ({})  price {}  cost {}  stock {}",
        verb,
        item.name,
        item.id,
        state.config.format_money(item.price()),
        state.config.format_money(item.cost()),
        item.qty
    ))
}

/// Closes the open modal. The cart is kept.
pub fn cancel<S>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    state.session.cancel()?;
    Ok("Cancelled".to_string())
}

/// Leaves the scanner; an unsold cart is discarded.
pub fn exit<S>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    let discarded = state.session.exit();
    info!(discarded, "Scanner closed");
    Ok(match discarded {
        0 => "Scanner closed".to_string(),
        n => format!("Scanner closed, {} cart line(s) discarded", n),
    })
}

fn render_form(form: &ItemForm) -> String {
    format!(
        "  name:  {}\n  cost:  {}\n  price: {}\n  qty:   {}\n(set <field> <value>, save, cancel)",
        form.name, form.cost, form.price, form.qty
    )
}

pub(crate) fn stock_flag(item: &InventoryItem) -> &'static str {
    if item.is_out_of_stock() {
        "  OUT"
    } else if item.is_low_stock() {
        "  LOW"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::tests::{register, run};
    use crate::error::ErrorCode;
    use sari_core::{DataFeed, SessionState};

    #[tokio::test]
    async fn test_sell_flow_builds_cart() {
        let (mut state, dir) = register().await;

        let err = run(&mut state, "111").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        run(&mut state, "open").await.unwrap();
        let prompt = run(&mut state, "111").await.unwrap();
        assert!(prompt.contains("5 available"));

        // modal open: a second scan is dropped
        let ignored = run(&mut state, "222").await.unwrap();
        assert!(ignored.contains("QTY_ENTRY"));

        let err = run(&mut state, "qty 0").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(state.session.state(), SessionState::QtyEntry);

        run(&mut state, "qty 3").await.unwrap();
        run(&mut state, "111").await.unwrap();
        let err = run(&mut state, "qty 3").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(state.session.cart().quantity_of("111"), 3);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_unknown_barcode_in_sell_mode() {
        let (mut state, dir) = register().await;
        run(&mut state, "open").await.unwrap();

        let err = run(&mut state, "999").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(state.session.state(), SessionState::Scanning);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_check_mode_needs_ack() {
        let (mut state, dir) = register().await;
        run(&mut state, "mode check").await.unwrap();

        let shown = run(&mut state, "222").await.unwrap();
        assert!(shown.contains("Pancit Canton"));
        assert!(shown.contains("₱15.00"));
        assert!(shown.contains("LOW"));
        assert_eq!(state.session.state(), SessionState::CheckPending);

        assert!(run(&mut state, "mode sell").await.is_err());
        run(&mut state, "ack").await.unwrap();
        run(&mut state, "mode sell").await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_add_mode_registers_and_persists() {
        let (mut state, dir) = register().await;
        run(&mut state, "mode add").await.unwrap();

        let form = run(&mut state, "333").await.unwrap();
        assert!(form.starts_with("New barcode 333"));

        // name is required
        let err = run(&mut state, "save").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(state.session.state(), SessionState::AddPending);

        run(&mut state, "set name Sardinas").await.unwrap();
        run(&mut state, "set price 22.50").await.unwrap();
        run(&mut state, "set qty 12").await.unwrap();
        let saved = run(&mut state, "save").await.unwrap();
        assert!(saved.starts_with("Registered Sardinas"));

        let stored = state.sink.load().await.unwrap();
        let item = stored.catalog.lookup("333").unwrap();
        assert_eq!(item.price_centavos, 2250);
        assert_eq!(item.cost_centavos, 0);
        assert_eq!(item.qty, 12);

        // edit pre-fills from the record
        let form = run(&mut state, "333").await.unwrap();
        assert!(form.contains("Sardinas"));
        run(&mut state, "cancel").await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_exit_discards_cart() {
        let (mut state, dir) = register().await;
        run(&mut state, "open").await.unwrap();
        run(&mut state, "111").await.unwrap();
        run(&mut state, "qty 1").await.unwrap();

        let closed = run(&mut state, "exit").await.unwrap();
        assert!(closed.contains("1 cart line(s) discarded"));
        assert!(state.session.cart().is_empty());
        assert_eq!(state.session.state(), SessionState::Idle);

        // nothing was written for the discarded cart
        assert_eq!(state.sink.load().await.unwrap().catalog.lookup("111").unwrap().qty, 5);
        let _ = std::fs::remove_dir_all(dir);
    }
}
