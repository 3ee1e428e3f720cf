//! # Expense Commands
//!
//! Expenses are entered by hand and dated today. An edit changes the title
//! and amount only.

use chrono::{Datelike, Local};
use sari_core::expense::{edit_expense, new_expense};
use sari_core::ledger::monthly_expenses;
use sari_core::{CommitSink, DataFeed};
use std::fmt::Write;

use crate::error::{RegisterError, RegisterResult};
use crate::state::RegisterState;

pub async fn add<S: CommitSink + DataFeed>(
    state: &mut RegisterState<S>,
    amount: &str,
    title: &str,
) -> RegisterResult<String> {
    let expense = new_expense(title, amount, Local::now().date_naive())?;
    let reply = format!(
        "Recorded {} {} ({})",
        expense.title,
        state.config.format_money(expense.amount()),
        expense.id
    );
    state.store.save_expense(&state.sink, expense).await?;
    state.refresh().await;
    Ok(reply)
}

pub async fn edit<S: CommitSink + DataFeed>(
    state: &mut RegisterState<S>,
    id: &str,
    amount: &str,
    title: &str,
) -> RegisterResult<String> {
    let existing = state
        .store
        .find_expense(id)
        .ok_or_else(|| RegisterError::not_found("Expense", id))?;
    let edited = edit_expense(existing, title, amount)?;
    let reply = format!(
        "Updated {} {}",
        edited.title,
        state.config.format_money(edited.amount())
    );
    state.store.save_expense(&state.sink, edited).await?;
    state.refresh().await;
    Ok(reply)
}

pub async fn delete<S: CommitSink + DataFeed>(state: &mut RegisterState<S>, id: &str) -> RegisterResult<String> {
    if state.store.find_expense(id).is_none() {
        return Err(RegisterError::not_found("Expense", id));
    }
    let removed = state.store.delete_expense(&state.sink, id).await?;
    state.refresh().await;
    Ok(format!("Deleted expense {}", removed.title))
}

/// Expenses of one month, newest first. Defaults to the current month.
pub fn month<S>(state: &RegisterState<S>, month: Option<(i32, u32)>) -> RegisterResult<String> {
    let (year, month) = month.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        (today.year(), today.month())
    });
    let listing = monthly_expenses(&state.store.expenses, year, month)?;

    let mut out = format!("Expenses {}-{:02}\n", listing.year, listing.month);
    for expense in &listing.expenses {
        let _ = writeln!(
            out,
            "  {}  {:<24} {:>10}  {}",
            expense.date,
            expense.title,
            state.config.format_money(expense.amount()),
            expense.id
        );
    }
    let _ = write!(out, "  Total {}", state.config.format_money(listing.total));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{register, run};
    use crate::error::ErrorCode;
    use sari_core::Money;

    #[tokio::test]
    async fn test_expense_lifecycle() {
        let (mut state, dir) = register().await;

        let reply = run(&mut state, "expense add 250.50 Tubig at kuryente").await.unwrap();
        assert!(reply.starts_with("Recorded Tubig at kuryente ₱250.50"));
        let id = state.store.expenses[0].id.clone();
        let date = state.store.expenses[0].date;

        run(&mut state, &format!("expense edit {} 300 Tubig", id)).await.unwrap();
        let stored = state.sink.load().await.unwrap().expenses;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Tubig");
        assert_eq!(stored[0].amount(), Money::from_pesos(300));
        assert_eq!(stored[0].date, date);

        let listing = run(&mut state, "expense month").await.unwrap();
        assert!(listing.ends_with("Total ₱300.00"));

        run(&mut state, &format!("expense delete {}", id)).await.unwrap();
        assert!(state.sink.load().await.unwrap().expenses.is_empty());
        let err = run(&mut state, &format!("expense delete {}", id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_expense_validation() {
        let (mut state, dir) = register().await;

        let err = run(&mut state, "expense add 0 Renta").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = run(&mut state, "expense add 100").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = run(&mut state, "expense month 2025-13").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(state.store.expenses.is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }
}
