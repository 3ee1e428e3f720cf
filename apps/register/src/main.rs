//! # Sari Register Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Register                                │
//! │                                                                         │
//! │  barcode scanner (keyboard wedge) ──┐                                  │
//! │                                     ├──► stdin ──► sari_register::run  │
//! │  keyboard ──────────────────────────┘                  │               │
//! │                                                        ▼               │
//! │                                          sari-core ──► sari-db         │
//! │                                                                         │
//! │  prompts and receipts ◄── stdout          logs ◄── stderr              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match sari_register::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
