//! # Ledger Commands
//!
//! Sales reports, the dashboard summary and the fast-moving list.
//!
//! `report <window> [date] json` prints the [`LedgerReport`] as JSON, the
//! shape the document renderer consumes.

use chrono::{Local, NaiveDate};
use sari_core::ledger::{daily_summary, fast_moving_items, window_report, LedgerReport, LedgerSummary};
use sari_core::TimeWindow;
use std::fmt::Write;

use crate::error::{RegisterError, RegisterResult};
use crate::state::{RegisterConfig, RegisterState};

pub fn report<S>(
    state: &RegisterState<S>,
    window: TimeWindow,
    anchor: Option<NaiveDate>,
    json: bool,
) -> RegisterResult<String> {
    let anchor = anchor.unwrap_or_else(today);
    let report = window_report(&state.store.sales, &state.store.expenses, window, anchor);

    if json {
        return serde_json::to_string_pretty(&report)
            .map_err(|e| RegisterError::storage(format!("cannot encode report: {}", e)));
    }
    Ok(render_report(&state.config, &report))
}

/// The dashboard: today's figures unless a date is given.
pub fn summary<S>(state: &RegisterState<S>, date: Option<NaiveDate>) -> RegisterResult<String> {
    let date = date.unwrap_or_else(today);
    let summary = daily_summary(&state.store.sales, &state.store.expenses, date);
    Ok(format!(
        "{} {}\n{}",
        state.config.store_name,
        date,
        render_summary(&state.config, &summary)
    ))
}

/// Best sellers over the whole sales history.
pub fn top<S>(state: &RegisterState<S>) -> RegisterResult<String> {
    let movers = fast_moving_items(&state.store.sales, state.config.fast_moving_limit);
    if movers.is_empty() {
        return Ok("No sales yet".to_string());
    }

    let mut out = String::new();
    for (rank, mover) in movers.iter().enumerate() {
        let _ = writeln!(out, "  {}. {:<24} {:>5} sold", rank + 1, mover.item_name, mover.qty_sold);
    }
    Ok(out.trim_end().to_string())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn render_report(config: &RegisterConfig, report: &LedgerReport) -> String {
    let mut out = format!("{} report {} to {}\n", report.window, report.start, report.end);
    if report.lines.is_empty() {
        out.push_str("  no sales in this window\n");
    }
    for line in &report.lines {
        let markup = match line.markup_pct {
            Some(pct) => format!("{}%", pct),
            None => "n/a".to_string(),
        };
        let _ = writeln!(
            out,
            "  {}  {:<20} {:>3} × {:>9}  total {:>10}  profit {:>10}  markup {}",
            line.date,
            line.item_name,
            line.qty_sold,
            config.format_money(line.selling_price),
            config.format_money(line.total),
            config.format_money(line.profit),
            markup
        );
    }
    out.push_str(&render_summary(config, &report.summary));
    out
}

fn render_summary(config: &RegisterConfig, summary: &LedgerSummary) -> String {
    format!(
        "  Revenue       {:>12}\n  Gross profit  {:>12}\n  Expenses      {:>12}\n  Net profit    {:>12}",
        config.format_money(summary.revenue),
        config.format_money(summary.gross_profit),
        config.format_money(summary.total_expenses),
        config.format_money(summary.net_profit)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{register, run};
    use chrono::Utc;
    use sari_core::{ExpenseRecord, SaleRecord};

    fn sale(date: &str, name: &str, qty: i64) -> SaleRecord {
        SaleRecord {
            id: format!("{}-{}", date, name),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            item_name: name.to_string(),
            selling_price_centavos: 5000,
            capital_price_centavos: 3000,
            qty_sold: qty,
            total_centavos: 5000 * qty,
            profit_centavos: 2000 * qty,
            created_at: Utc::now(),
        }
    }

    /// The amount printed on a summary row.
    fn row<'a>(text: &'a str, label: &str) -> &'a str {
        text.lines()
            .find_map(|l| l.trim_start().strip_prefix(label))
            .map(str::trim)
            .unwrap()
    }

    #[tokio::test]
    async fn test_weekly_report_and_json_export() {
        let (mut state, dir) = register().await;
        state.store.sales = vec![
            sale("2025-01-01", "Kape", 2),
            sale("2025-01-05", "Kape", 1),
            sale("2025-02-01", "Kape", 4),
        ];
        state.store.expenses = vec![ExpenseRecord {
            id: "e1".to_string(),
            title: "Renta".to_string(),
            amount_centavos: 5000,
            date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        }];

        let text = run(&mut state, "report weekly 2025-01-05").await.unwrap();
        assert!(text.starts_with("WEEKLY report 2024-12-30 to 2025-01-05"));
        assert!(text.contains("markup 67%"));
        assert_eq!(row(&text, "Revenue"), "₱150.00");
        assert_eq!(row(&text, "Net profit"), "₱10.00");
        assert!(!text.contains("2025-02-01"));

        let json = run(&mut state, "report monthly 2025-01-05 json").await.unwrap();
        let parsed: LedgerReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.summary.revenue.centavos(), 15000);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_top_and_summary() {
        let (mut state, dir) = register().await;
        assert_eq!(run(&mut state, "top").await.unwrap(), "No sales yet");

        state.config.fast_moving_limit = 3;
        state.store.sales = vec![
            sale("2025-01-05", "A", 3),
            sale("2025-01-05", "B", 5),
            sale("2025-01-06", "A", 2),
            sale("2025-01-06", "C", 1),
            sale("2025-01-06", "D", 1),
        ];
        let top = run(&mut state, "top").await.unwrap();
        let names: Vec<&str> = top
            .lines()
            .map(|l| l.split_whitespace().nth(1).unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let summary = run(&mut state, "summary 2025-01-05").await.unwrap();
        assert!(summary.starts_with("Sari-Sari Store 2025-01-05"));
        assert_eq!(row(&summary, "Revenue"), "₱400.00");

        let _ = std::fs::remove_dir_all(dir);
    }
}
