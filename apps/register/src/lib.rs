//! # Sari Register Library
//!
//! The terminal register: reads one line at a time from the scanner or
//! keyboard, runs it against the consistency engine, prints the reply.
//!
//! ## Module Organization
//! ```text
//! sari_register/
//! ├── lib.rs          ◄─── You are here (startup & input loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── RegisterState (config, session, store, sink)
//! │   ├── backend.rs  ◄─── SQLite or snapshot sink, chosen at startup
//! │   └── config.rs   ◄─── RegisterConfig (defaults → TOML → env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Line parser and dispatch
//! │   ├── scan.rs     ◄─── Scanner session
//! │   ├── cart.rs     ◄─── Cart review and checkout
//! │   ├── inventory.rs◄─── Inventory screen
//! │   ├── report.rs   ◄─── Reports and dashboard
//! │   ├── expense.rs  ◄─── Expenses
//! │   └── admin.rs    ◄─── Factory reset, reload
//! └── error.rs        ◄─── RegisterError for every command
//! ```

pub mod commands;
pub mod error;
pub mod state;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commands::Command;
use error::{RegisterError, RegisterResult};
use state::{Backend, RegisterConfig, RegisterState};

/// Runs the register until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Register Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber to stderr, RUST_LOG overrides                  │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → register.toml → SARI_* env                             │
/// │                                                                         │
/// │  3. Open Backend ─────────────────────────────────────────────────────► │
/// │     • sqlite: sari.db, WAL, migrations                                  │
/// │     • snapshot: store.json                                              │
/// │                                                                         │
/// │  4. Load Store ───────────────────────────────────────────────────────► │
/// │     • catalog, sales, expenses from the data feed                       │
/// │                                                                         │
/// │  5. Input Loop ───────────────────────────────────────────────────────► │
/// │     • scanner opens in SELL mode                                        │
/// │     • every error prints and the prompt returns                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> RegisterResult<()> {
    init_tracing();
    info!("Starting Sari POS register");

    let config = RegisterConfig::load()?;
    let backend = Backend::open(&config).await?;
    let mut state = RegisterState::open(config, backend).await?;
    state.session.open();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_out(
        &mut stdout,
        &format!(
            "{} ({} items loaded, {:?} backend)\nType `help` for commands.\n",
            state.config.store_name,
            state.store.catalog.len(),
            state.sink.kind()
        ),
    )
    .await?;

    loop {
        let prompt = format!("{} {}> ", state.session.mode(), state.session.state());
        write_out(&mut stdout, &prompt).await?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => return Err(RegisterError::storage(format!("cannot read input: {}", err))),
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match commands::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => commands::execute(&mut state, command).await,
            Err(err) => Err(err),
        };
        let text = match reply {
            Ok(text) => text,
            Err(err) => {
                warn!(code = %err.code, message = %err.message, "Command failed");
                err.to_string()
            }
        };
        write_out(&mut stdout, &format!("{}\n", text)).await?;
    }

    if !state.session.cart().is_empty() {
        warn!(lines = state.session.cart().line_count(), "Unsold cart discarded on quit");
    }
    state.sink.close().await;
    info!("Register stopped");
    Ok(())
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) -> RegisterResult<()> {
    let write = async {
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await
    };
    write
        .await
        .map_err(|e| RegisterError::storage(format!("cannot write output: {}", e)))
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=sari=trace` - Show trace for sari crates only
/// - Default: `info,sari=debug,sqlx=warn`
///
/// Logs go to stderr so they never interleave with the prompt.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sari=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
