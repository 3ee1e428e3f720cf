//! # Register Commands
//!
//! One input line is one command. A keyboard-wedge scanner types the barcode
//! and presses Enter, so any line that does not start with a command word is
//! treated as a scan.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (parse + dispatch)
//! ├── scan.rs       ◄─── open, mode, scan, qty, ack, set, save, cancel, exit
//! ├── cart.rs       ◄─── cart, review, remove, discount, checkout, void
//! ├── inventory.rs  ◄─── inventory, low, delete
//! ├── report.rs     ◄─── report, summary, top
//! ├── expense.rs    ◄─── expense add / edit / delete / month
//! └── admin.rs      ◄─── wipe, reload
//! ```
//!
//! ## Flow
//! ```text
//!   "qty 3"  ──► parse() ──► Command::Qty("3") ──► execute() ──► scan::qty()
//!                                                                    │
//!   "Added 3 × Kape ..."  ◄──────────── Ok(String) ◄─────────────────┘
//! ```

pub mod admin;
pub mod cart;
pub mod expense;
pub mod inventory;
pub mod report;
pub mod scan;

use chrono::NaiveDate;
use sari_core::{CommitSink, DataFeed, ScanMode, TimeWindow};

use crate::error::{RegisterError, RegisterResult};
use crate::state::RegisterState;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,

    // Scanner session
    Open,
    Mode(ScanMode),
    Scan(String),
    Qty(String),
    Ack,
    Set { field: String, value: String },
    Save,
    Cancel,
    Exit,

    // Cart
    Cart,
    Review,
    Remove(usize),
    Discount(String),
    Checkout,
    Void,

    // Inventory screen
    Inventory(Option<String>),
    Low,
    Delete(String),

    // Ledger
    Report { window: TimeWindow, anchor: Option<NaiveDate>, json: bool },
    Summary(Option<NaiveDate>),
    Top,

    // Expenses
    ExpenseAdd { amount: String, title: String },
    ExpenseEdit { id: String, amount: String, title: String },
    ExpenseDelete(String),
    ExpenseMonth(Option<(i32, u32)>),

    // Admin
    Wipe(String),
    Reload,
}

pub const HELP: &str = "\
Scanner:   open | mode check|add|sell | <barcode> | scan <barcode> | qty <n> | ack | cancel | exit
Item form: set name|cost|price|qty <value> | save | cancel
Cart:      cart | review | remove <line> | discount <amount> | checkout | void
Inventory: inventory [search] | low | delete <barcode>
Ledger:    report daily|weekly|monthly [YYYY-MM-DD] [json] | summary [YYYY-MM-DD] | top
Expenses:  expense add <amount> <title> | expense edit <id> <amount> <title>
           expense delete <id> | expense month [YYYY-MM]
Admin:     wipe <pin> | reload | help | quit";

/// Parses one trimmed input line.
pub fn parse(line: &str) -> RegisterResult<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "quit" => Command::Quit,

        "open" | "start" => Command::Open,
        "mode" => Command::Mode(required(rest, "mode check|add|sell")?.parse()?),
        "scan" => Command::Scan(required(rest, "scan <barcode>")?.to_string()),
        "qty" | "q" => Command::Qty(required(rest, "qty <n>")?.to_string()),
        "ack" | "ok" => Command::Ack,
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(f, v)| (f, v.trim()))
                .unwrap_or((rest, ""));
            Command::Set {
                field: required(field, "set <field> <value>")?.to_string(),
                value: value.to_string(),
            }
        }
        "save" => Command::Save,
        "cancel" => Command::Cancel,
        "exit" | "close" => Command::Exit,

        "cart" => Command::Cart,
        "review" | "pay" => Command::Review,
        "remove" | "rm" => Command::Remove(line_number(required(rest, "remove <line>")?)?),
        "discount" => Command::Discount(required(rest, "discount <amount>")?.to_string()),
        "checkout" | "done" => Command::Checkout,
        "void" => Command::Void,

        "inventory" | "inv" => Command::Inventory(Some(rest.to_string()).filter(|q| !q.is_empty())),
        "low" => Command::Low,
        "delete" => Command::Delete(required(rest, "delete <barcode>")?.to_string()),

        "report" => parse_report(rest)?,
        "summary" | "dashboard" => Command::Summary(optional_date(rest)?),
        "top" => Command::Top,

        "expense" => parse_expense(rest)?,

        "wipe" => Command::Wipe(required(rest, "wipe <pin>")?.to_string()),
        "reload" => Command::Reload,

        _ => Command::Scan(line.to_string()),
    };
    Ok(command)
}

/// Runs one command against the register.
pub async fn execute<S: CommitSink + DataFeed>(
    state: &mut RegisterState<S>,
    command: Command,
) -> RegisterResult<String> {
    match command {
        Command::Help => Ok(HELP.to_string()),
        // the input loop stops before dispatching quit
        Command::Quit => Ok(String::new()),

        Command::Open => scan::open(state),
        Command::Mode(mode) => scan::mode(state, mode),
        Command::Scan(raw) => scan::scan(state, &raw),
        Command::Qty(input) => scan::qty(state, &input),
        Command::Ack => scan::ack(state),
        Command::Set { field, value } => scan::set(state, &field, &value),
        Command::Save => scan::save(state).await,
        Command::Cancel => scan::cancel(state),
        Command::Exit => scan::exit(state),

        Command::Cart => cart::show(state),
        Command::Review => cart::review(state),
        Command::Remove(line) => cart::remove(state, line),
        Command::Discount(input) => cart::discount(state, &input),
        Command::Checkout => cart::checkout(state).await,
        Command::Void => cart::void(state),

        Command::Inventory(query) => inventory::list(state, query.as_deref()),
        Command::Low => inventory::low(state),
        Command::Delete(barcode) => inventory::delete(state, &barcode).await,

        Command::Report { window, anchor, json } => report::report(state, window, anchor, json),
        Command::Summary(date) => report::summary(state, date),
        Command::Top => report::top(state),

        Command::ExpenseAdd { amount, title } => expense::add(state, &amount, &title).await,
        Command::ExpenseEdit { id, amount, title } => expense::edit(state, &id, &amount, &title).await,
        Command::ExpenseDelete(id) => expense::delete(state, &id).await,
        Command::ExpenseMonth(month) => expense::month(state, month),

        Command::Wipe(pin) => admin::wipe(state, &pin).await,
        Command::Reload => admin::reload(state).await,
    }
}

// =============================================================================
// Argument Helpers
// =============================================================================

fn required<'a>(value: &'a str, usage: &str) -> RegisterResult<&'a str> {
    if value.trim().is_empty() {
        return Err(RegisterError::bad_command(format!("usage: {}", usage)));
    }
    Ok(value.trim())
}

/// Cart lines are numbered from 1 on screen.
fn line_number(input: &str) -> RegisterResult<usize> {
    match input.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(RegisterError::bad_command(format!("'{}' is not a cart line number", input))),
    }
}

fn parse_date(input: &str) -> RegisterResult<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| RegisterError::bad_command(format!("'{}' is not a date (YYYY-MM-DD)", input)))
}

fn optional_date(input: &str) -> RegisterResult<Option<NaiveDate>> {
    match input.trim() {
        "" => Ok(None),
        text => parse_date(text).map(Some),
    }
}

fn parse_report(rest: &str) -> RegisterResult<Command> {
    let mut words = rest.split_whitespace();
    let window = words
        .next()
        .ok_or_else(|| RegisterError::bad_command("usage: report daily|weekly|monthly [YYYY-MM-DD] [json]"))?
        .parse::<TimeWindow>()?;

    let mut anchor = None;
    let mut json = false;
    for word in words {
        if word.eq_ignore_ascii_case("json") {
            json = true;
        } else {
            anchor = Some(parse_date(word)?);
        }
    }
    Ok(Command::Report { window, anchor, json })
}

fn parse_expense(rest: &str) -> RegisterResult<Command> {
    let usage = "expense add|edit|delete|month ...";
    let (action, rest) = rest
        .split_once(char::is_whitespace)
        .map(|(a, r)| (a, r.trim()))
        .unwrap_or((rest, ""));

    match action.to_lowercase().as_str() {
        "add" => {
            let (amount, title) = split_first(rest, "expense add <amount> <title>")?;
            Ok(Command::ExpenseAdd { amount, title })
        }
        "edit" => {
            let (id, rest) = split_first(rest, "expense edit <id> <amount> <title>")?;
            let (amount, title) = split_first(&rest, "expense edit <id> <amount> <title>")?;
            Ok(Command::ExpenseEdit { id, amount, title })
        }
        "delete" | "rm" => Ok(Command::ExpenseDelete(
            required(rest, "expense delete <id>")?.to_string(),
        )),
        "month" | "list" | "" => {
            if rest.is_empty() {
                return Ok(Command::ExpenseMonth(None));
            }
            let parsed = rest
                .split_once('-')
                .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
                .ok_or_else(|| RegisterError::bad_command(format!("'{}' is not a month (YYYY-MM)", rest)))?;
            Ok(Command::ExpenseMonth(Some(parsed)))
        }
        _ => Err(RegisterError::bad_command(format!("usage: {}", usage))),
    }
}

/// Splits `"<first> <rest...>"`; the rest may be empty.
fn split_first(input: &str, usage: &str) -> RegisterResult<(String, String)> {
    let input = required(input, usage)?;
    Ok(match input.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (input.to_string(), String::new()),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sari_core::{Catalog, InventoryItem};
    use sari_db::SnapshotSink;
    use std::path::PathBuf;
    use uuid::Uuid;

    use crate::state::RegisterConfig;

    pub fn item(id: &str, name: &str, cost_pesos: i64, price_pesos: i64, qty: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            cost_centavos: cost_pesos * 100,
            price_centavos: price_pesos * 100,
            qty,
        }
    }

    /// A register on a fresh snapshot file, seeded with two items.
    pub async fn register() -> (RegisterState<SnapshotSink>, PathBuf) {
        let dir = std::env::temp_dir().join(format!("sari-register-{}", Uuid::new_v4()));
        let sink = SnapshotSink::open(dir.join("store.json")).await.unwrap();
        let config = RegisterConfig {
            data_dir: Some(dir.clone()),
            reset_pin: Some("2468".to_string()),
            ..RegisterConfig::default()
        };
        let mut state = RegisterState::open(config, sink).await.unwrap();

        let seed = Catalog::from_items(vec![
            item("111", "Kape", 30, 50, 5),
            item("222", "Pancit Canton", 12, 15, 2),
        ]);
        for item in seed.items() {
            state.store.save_item(&state.sink, item.clone()).await.unwrap();
        }
        (state, dir)
    }

    /// Runs a line through parse and execute.
    pub async fn run(state: &mut RegisterState<SnapshotSink>, line: &str) -> RegisterResult<String> {
        execute(state, parse(line)?).await
    }

    #[test]
    fn test_bare_line_is_a_scan() {
        assert_eq!(parse(" 4800016644290 ").unwrap(), Command::Scan("4800016644290".to_string()));
        assert_eq!(parse("scan 111").unwrap(), Command::Scan("111".to_string()));
        assert_eq!(parse("QTY 3").unwrap(), Command::Qty("3".to_string()));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse("mode add").unwrap(), Command::Mode(ScanMode::Add));
        assert!(parse("mode fly").is_err());
        assert_eq!(parse("remove 2").unwrap(), Command::Remove(1));
        assert!(parse("remove 0").is_err());
        assert_eq!(
            parse("set name Kape Barako").unwrap(),
            Command::Set {
                field: "name".to_string(),
                value: "Kape Barako".to_string()
            }
        );
        assert_eq!(
            parse("report weekly 2025-01-05 json").unwrap(),
            Command::Report {
                window: TimeWindow::Weekly,
                anchor: NaiveDate::from_ymd_opt(2025, 1, 5),
                json: true
            }
        );
        assert!(parse("report yearly").is_err());
        assert!(parse("summary 2025-13-01").is_err());
        assert!(parse("wipe").is_err());
    }

    #[test]
    fn test_parse_expense() {
        assert_eq!(
            parse("expense add 250.50 Tubig at kuryente").unwrap(),
            Command::ExpenseAdd {
                amount: "250.50".to_string(),
                title: "Tubig at kuryente".to_string()
            }
        );
        assert_eq!(
            parse("expense edit abc 300 Tubig").unwrap(),
            Command::ExpenseEdit {
                id: "abc".to_string(),
                amount: "300".to_string(),
                title: "Tubig".to_string()
            }
        );
        assert_eq!(parse("expense month 2025-02").unwrap(), Command::ExpenseMonth(Some((2025, 2))));
        assert_eq!(parse("expense").unwrap(), Command::ExpenseMonth(None));
        assert!(parse("expense month feb").is_err());
        assert!(parse("expense add").is_err());
    }
}
