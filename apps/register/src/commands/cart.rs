//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Review  │────►│   Sold   │       │
//! │  │  Cart    │ qty │          │review│ discount│check│ (IDLE)   │       │
//! │  └──────────┘     └──────────┘     └──────────┘ out └──────────┘       │
//! │       ▲                │                 │                              │
//! │       │           remove <n>        commit failed                      │
//! │       │                │            → stays in review,                 │
//! │       └──── void ──────┘              nothing changed                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sari_core::validation::parse_optional_money;
use sari_core::{CommitSink, DataFeed, SaleStamp};
use std::fmt::Write;

use crate::error::RegisterResult;
use crate::state::RegisterState;

/// Prints the cart with totals.
///
/// ```text
///   1. Kape                 2 × ₱50.00      ₱100.00
///   2. Pancit Canton        1 × ₱15.00       ₱15.00
///   Subtotal                                ₱115.00
///   Discount                                 ₱15.00
///   TOTAL                                   ₱100.00
/// ```
pub fn show<S>(state: &RegisterState<S>) -> RegisterResult<String> {
    let config = &state.config;
    let cart = state.session.cart();
    if cart.is_empty() {
        return Ok("Cart is empty".to_string());
    }

    let mut out = String::new();
    for (i, line) in cart.lines().iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<20} {:>3} × {:>9}  {:>10}",
            i + 1,
            line.item.name,
            line.cart_qty,
            config.format_money(line.item.price()),
            config.format_money(line.subtotal)
        );
    }
    let _ = writeln!(out, "  {:<38}{:>10}", "Subtotal", config.format_money(cart.subtotal()));
    if state.session.discount().is_positive() {
        let _ = writeln!(out, "  {:<38}{:>10}", "Discount", config.format_money(state.session.discount()));
    }
    let _ = write!(out, "  {:<38}{:>10}", "TOTAL", config.format_money(state.session.grand_total()?));
    Ok(out)
}

pub fn review<S>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    state.session.review_cart()?;
    Ok(format!("{}\n(discount <amount>, remove <line>, checkout, cancel)", show(state)?))
}

pub fn remove<S>(state: &mut RegisterState<S>, index: usize) -> RegisterResult<String> {
    let removed = state.session.remove_line(index)?;
    Ok(format!("Removed {}\n{}", removed.item.name, show(state)?))
}

pub fn discount<S>(state: &mut RegisterState<S>, input: &str) -> RegisterResult<String> {
    let amount = parse_optional_money("discount", input)?;
    state.session.set_discount(amount)?;
    show(state)
}

/// Commits the cart. On failure the cart, discount and stock are untouched.
pub async fn checkout<S: CommitSink + DataFeed>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    let plan = state
        .session
        .checkout(&mut state.store, &state.sink, SaleStamp::now())
        .await?;
    state.refresh().await;
    state.session.open();

    let config = &state.config;
    let mut out = format!(
        "Sold {} line(s). Total {}",
        plan.sales.len(),
        config.format_money(plan.grand_total)
    );
    if plan.discount.is_positive() {
        let _ = write!(out, " (discount {})", config.format_money(plan.discount));
    }
    let _ = write!(out, ", profit {}", config.format_money(plan.profit()));
    Ok(out)
}

pub fn void<S>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    let discarded = state.session.void_cart()?;
    Ok(format!("Voided {} line(s)", discarded))
}

#[cfg(test)]
mod tests {
    use crate::commands::tests::{register, run};
    use crate::error::ErrorCode;
    use sari_core::{DataFeed, Money, SessionState};

    #[tokio::test]
    async fn test_checkout_commits_stock_and_sales() {
        let (mut state, dir) = register().await;
        run(&mut state, "open").await.unwrap();
        run(&mut state, "111").await.unwrap();
        run(&mut state, "qty 4").await.unwrap();
        run(&mut state, "review").await.unwrap();
        run(&mut state, "discount 20").await.unwrap();

        let done = run(&mut state, "checkout").await.unwrap();
        assert_eq!(done, "Sold 1 line(s). Total ₱180.00 (discount ₱20.00), profit ₱60.00");
        assert_eq!(state.session.state(), SessionState::Scanning);
        assert!(state.session.cart().is_empty());
        assert_eq!(state.session.discount(), Money::zero());

        let stored = state.sink.load().await.unwrap();
        assert_eq!(stored.catalog.lookup("111").unwrap().qty, 1);
        assert_eq!(stored.sales.len(), 1);
        assert_eq!(stored.sales[0].total_centavos, 18000);
        assert_eq!(stored.sales[0].profit_centavos, 6000);
        assert_eq!(stored, state.store);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_discount_bounds_and_remove() {
        let (mut state, dir) = register().await;
        run(&mut state, "open").await.unwrap();
        run(&mut state, "111").await.unwrap();
        run(&mut state, "qty 1").await.unwrap();
        run(&mut state, "222").await.unwrap();
        run(&mut state, "qty 2").await.unwrap();

        // discount only in review
        assert_eq!(run(&mut state, "discount 5").await.unwrap_err().code, ErrorCode::InvalidState);

        run(&mut state, "review").await.unwrap();
        let err = run(&mut state, "discount 81").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        run(&mut state, "discount 60").await.unwrap();

        // dropping Kape leaves a ₱30 subtotal, so the ₱60 discount is reset
        let shown = run(&mut state, "remove 1").await.unwrap();
        assert!(shown.contains("Removed Kape"));
        assert_eq!(state.session.discount(), Money::zero());
        assert!(run(&mut state, "remove 5").await.is_err());

        let voided = run(&mut state, "void").await.unwrap();
        assert_eq!(voided, "Voided 1 line(s)");
        assert_eq!(state.session.state(), SessionState::Scanning);
        assert_eq!(run(&mut state, "review").await.unwrap_err().code, ErrorCode::ValidationError);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_everything() {
        let (mut state, dir) = register().await;
        run(&mut state, "open").await.unwrap();
        run(&mut state, "111").await.unwrap();
        run(&mut state, "qty 2").await.unwrap();
        run(&mut state, "review").await.unwrap();

        // the item is removed from storage behind the register's back
        sari_core::CommitSink::delete_item(&state.sink, "111").await.unwrap();
        let stored_before = state.sink.load().await.unwrap();
        let cart_before = state.session.cart().clone();

        // still in the local catalog, so only the sink can reject it
        let err = run(&mut state, "checkout").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CommitFailed);
        assert_eq!(state.session.state(), SessionState::CartReview);
        assert_eq!(state.session.cart(), &cart_before);
        assert_eq!(state.store.catalog.lookup("111").unwrap().qty, 5);
        assert!(state.store.sales.is_empty());
        assert_eq!(state.sink.load().await.unwrap(), stored_before);

        let _ = std::fs::remove_dir_all(dir);
    }
}
