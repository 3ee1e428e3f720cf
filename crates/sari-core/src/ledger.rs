//! # Ledger Aggregator
//!
//! Read-only views over the sales and expense history: window filters,
//! summaries, fast-moving items, and the per-line report handed to the
//! document renderer.
//!
//! ## Windows
//! ```text
//! anchor = 2025-01-05
//!
//! DAILY    2025-01-05 only
//! WEEKLY   2024-12-30 .. 2025-01-05   (anchor − 6 days, inclusive)
//! MONTHLY  2025-01-01 .. 2025-01-31   (anchor's calendar month)
//! ```
//!
//! Dates are compared as [`NaiveDate`] values; no time zone is involved.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Dated, ExpenseRecord, SaleRecord, TimeWindow};
use crate::validation::ValidationResult;

// =============================================================================
// Window Filters
// =============================================================================

/// First and last day (inclusive) of `window` around `anchor`.
pub fn window_bounds(window: TimeWindow, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    match window {
        TimeWindow::Daily => (anchor, anchor),
        TimeWindow::Weekly => (
            anchor.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN),
            anchor,
        ),
        TimeWindow::Monthly => {
            let first = anchor.with_day(1).unwrap_or(anchor);
            let next_month = if anchor.month() == 12 {
                NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(anchor.year(), anchor.month() + 1, 1)
            };
            let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(anchor);
            (first, last)
        }
    }
}

/// Whether `date` falls in `window` around `anchor`.
pub fn in_window(date: NaiveDate, window: TimeWindow, anchor: NaiveDate) -> bool {
    let (start, end) = window_bounds(window, anchor);
    start <= date && date <= end
}

/// Records dated inside the window, in their original order.
pub fn filter_by_window<T: Dated>(records: &[T], window: TimeWindow, anchor: NaiveDate) -> Vec<&T> {
    records
        .iter()
        .filter(|r| in_window(r.date(), window, anchor))
        .collect()
}

// =============================================================================
// Fast-Moving Items
// =============================================================================

/// An item name and the units sold under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FastMover {
    pub item_name: String,
    pub qty_sold: i64,
}

/// Top `top_n` item names by summed quantity sold.
///
/// Grouping is by name, so a deleted-and-re-registered item keeps its
/// history. Ties keep first-seen order.
pub fn fast_moving_items<'a>(sales: impl IntoIterator<Item = &'a SaleRecord>, top_n: usize) -> Vec<FastMover> {
    let mut movers: Vec<FastMover> = Vec::new();
    for sale in sales {
        match movers.iter_mut().find(|m| m.item_name == sale.item_name) {
            Some(mover) => mover.qty_sold = mover.qty_sold.saturating_add(sale.qty_sold),
            None => movers.push(FastMover {
                item_name: sale.item_name.clone(),
                qty_sold: sale.qty_sold,
            }),
        }
    }

    // sort_by is stable
    movers.sort_by(|a, b| b.qty_sold.cmp(&a.qty_sold));
    movers.truncate(top_n);
    movers
}

// =============================================================================
// Summaries
// =============================================================================

/// Money totals for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSummary {
    /// Σ sale total
    pub revenue: Money,
    /// Σ sale profit
    pub gross_profit: Money,
    /// Σ expense amount
    pub total_expenses: Money,
    /// gross_profit − total_expenses
    pub net_profit: Money,
}

impl LedgerSummary {
    pub fn from_records<'a>(
        sales: impl IntoIterator<Item = &'a SaleRecord>,
        expenses: impl IntoIterator<Item = &'a ExpenseRecord>,
    ) -> Self {
        let (revenue, gross_profit) = sales
            .into_iter()
            .fold((Money::zero(), Money::zero()), |(rev, profit), s| {
                (rev + s.total(), profit + s.profit())
            });
        let total_expenses: Money = expenses.into_iter().map(|e| e.amount()).sum();

        LedgerSummary {
            revenue,
            gross_profit,
            total_expenses,
            net_profit: gross_profit - total_expenses,
        }
    }
}

/// Summary for any window.
pub fn window_summary(
    sales: &[SaleRecord],
    expenses: &[ExpenseRecord],
    window: TimeWindow,
    anchor: NaiveDate,
) -> LedgerSummary {
    LedgerSummary::from_records(
        filter_by_window(sales, window, anchor),
        filter_by_window(expenses, window, anchor),
    )
}

/// Dashboard summary for one calendar day.
pub fn daily_summary(sales: &[SaleRecord], expenses: &[ExpenseRecord], date: NaiveDate) -> LedgerSummary {
    window_summary(sales, expenses, TimeWindow::Daily, date)
}

// =============================================================================
// Report
// =============================================================================

/// One row of the sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportLine {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub item_name: String,
    pub selling_price: Money,
    pub capital_price: Money,
    pub qty_sold: i64,
    pub total: Money,
    pub profit: Money,
    /// `None` when the item was sold without a recorded cost.
    pub markup_pct: Option<i64>,
}

impl From<&SaleRecord> for ReportLine {
    fn from(sale: &SaleRecord) -> Self {
        ReportLine {
            date: sale.date,
            item_name: sale.item_name.clone(),
            selling_price: sale.selling_price(),
            capital_price: sale.capital_price(),
            qty_sold: sale.qty_sold,
            total: sale.total(),
            profit: sale.profit(),
            markup_pct: sale.markup_pct(),
        }
    }
}

/// Everything a rendered sales report shows for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerReport {
    pub window: TimeWindow,
    #[ts(as = "String")]
    pub anchor: NaiveDate,
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
    pub lines: Vec<ReportLine>,
    pub summary: LedgerSummary,
}

/// Builds the report for `window` around `anchor`.
///
/// Lines are ordered by date, then by creation time.
pub fn window_report(
    sales: &[SaleRecord],
    expenses: &[ExpenseRecord],
    window: TimeWindow,
    anchor: NaiveDate,
) -> LedgerReport {
    let (start, end) = window_bounds(window, anchor);
    let mut in_range = filter_by_window(sales, window, anchor);
    in_range.sort_by_key(|s| (s.date, s.created_at));

    LedgerReport {
        window,
        anchor,
        start,
        end,
        lines: in_range.iter().map(|s| ReportLine::from(*s)).collect(),
        summary: window_summary(sales, expenses, window, anchor),
    }
}

// =============================================================================
// Monthly Expenses
// =============================================================================

/// Expenses of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyExpenses {
    pub year: i32,
    pub month: u32,
    pub expenses: Vec<ExpenseRecord>,
    pub total: Money,
}

/// Expenses dated in `month` of `year`, newest first.
pub fn monthly_expenses(expenses: &[ExpenseRecord], year: i32, month: u32) -> ValidationResult<MonthlyExpenses> {
    let anchor = NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::OutOfRange {
        field: "month".to_string(),
        min: 1,
        max: 12,
    })?;

    let mut selected: Vec<ExpenseRecord> = filter_by_window(expenses, TimeWindow::Monthly, anchor)
        .into_iter()
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    let total = selected.iter().map(|e| e.amount()).sum();

    Ok(MonthlyExpenses {
        year,
        month,
        expenses: selected,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
