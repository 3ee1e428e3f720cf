//! # Admin Commands
//!
//! Factory reset and a manual reload from storage.

use sari_core::{CommitSink, DataFeed};
use tracing::warn;

use crate::error::{ErrorCode, RegisterError, RegisterResult};
use crate::state::RegisterState;

/// Deletes every item, sale and expense.
///
/// ## When This Is Refused
/// - `reset_pin` is not configured
/// - the PIN does not match
///
/// A reset that stops part way reports what was cleared; running it again
/// clears the rest.
pub async fn wipe<S: CommitSink + DataFeed>(state: &mut RegisterState<S>, pin: &str) -> RegisterResult<String> {
    let expected = state.config.reset_pin.as_deref().ok_or_else(|| {
        RegisterError::new(ErrorCode::Unauthorized, "Factory reset is disabled; set reset_pin to enable it")
    })?;
    if pin.trim() != expected {
        warn!("Factory reset refused: wrong PIN");
        return Err(RegisterError::new(ErrorCode::Unauthorized, "Wrong PIN"));
    }

    // an open cart would point at items that are about to disappear
    state.session.exit();
    let result = state.store.wipe(&state.sink).await;
    state.refresh().await;
    let report = result?;

    let cleared: Vec<String> = report
        .cleared
        .iter()
        .map(|(collection, n)| format!("{} {}", n, collection))
        .collect();
    Ok(format!("Store wiped: {}", cleared.join(", ")))
}

pub async fn reload<S: CommitSink + DataFeed>(state: &mut RegisterState<S>) -> RegisterResult<String> {
    state.store = state.sink.load().await?;
    Ok(format!(
        "Reloaded {} item(s), {} sale(s), {} expense(s)",
        state.store.catalog.len(),
        state.store.sales.len(),
        state.store.expenses.len()
    ))
}

#[cfg(test)]
mod tests {
    use crate::commands::tests::{register, run};
    use crate::error::ErrorCode;
    use sari_core::{DataFeed, StoreSnapshot};

    #[tokio::test]
    async fn test_wipe_requires_pin() {
        let (mut state, dir) = register().await;

        assert_eq!(run(&mut state, "wipe 0000").await.unwrap_err().code, ErrorCode::Unauthorized);
        state.config.reset_pin = None;
        assert_eq!(run(&mut state, "wipe 2468").await.unwrap_err().code, ErrorCode::Unauthorized);
        assert_eq!(state.sink.load().await.unwrap().catalog.len(), 2);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_wipe_clears_everything() {
        let (mut state, dir) = register().await;
        run(&mut state, "open").await.unwrap();
        run(&mut state, "111").await.unwrap();
        run(&mut state, "qty 1").await.unwrap();
        run(&mut state, "review").await.unwrap();
        run(&mut state, "checkout").await.unwrap();
        run(&mut state, "expense add 50 Yelo").await.unwrap();
        run(&mut state, "222").await.unwrap();

        let reply = run(&mut state, "wipe 2468").await.unwrap();
        assert_eq!(reply, "Store wiped: 2 inventory, 1 sales, 1 expenses");
        assert_eq!(state.store, StoreSnapshot::default());
        assert_eq!(state.sink.load().await.unwrap(), StoreSnapshot::default());
        assert!(state.session.cart().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_reload() {
        let (mut state, dir) = register().await;
        state.store = StoreSnapshot::default();

        let reply = run(&mut state, "reload").await.unwrap();
        assert_eq!(reply, "Reloaded 2 item(s), 0 sale(s), 0 expense(s)");

        let _ = std::fs::remove_dir_all(dir);
    }
}
