//! # Register Error Type
//!
//! The single error type every register command returns.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Register                           │
//! │                                                                         │
//! │  operator types a line                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command handler  →  Result<String, RegisterError>               │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage error?  ─── DbError / SinkError ──────┐                 │  │
//! │  │         │                                      │                 │  │
//! │  │         ▼                                      ▼                 │  │
//! │  │  Engine error?   ─── CoreError ───────── RegisterError ────────► │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  "[INSUFFICIENT_STOCK] Only 2 left of Pancit Canton (you asked for 3)" │
//! │  ...and the prompt comes back. No error ends the session.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sari_core::{CoreError, SinkError, ValidationError};
use sari_db::DbError;
use serde::Serialize;
use std::fmt;

/// Error shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Barcode or record not in the store
    NotFound,

    /// Bad quantity, blank name, discount out of range
    ValidationError,

    /// Cart quantity exceeds stock
    InsufficientStock,

    /// Command not valid in the current session state
    InvalidState,

    /// Checkout or save was not persisted; nothing changed
    CommitFailed,

    /// Factory reset stopped part way
    ResetFailed,

    /// Wrong or missing reset PIN
    Unauthorized,

    /// Unknown command or bad arguments
    BadCommand,

    /// Configuration could not be loaded
    ConfigError,

    /// Storage could not be opened or read
    StorageError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::CommitFailed => "COMMIT_FAILED",
            ErrorCode::ResetFailed => "RESET_FAILED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::BadCommand => "BAD_COMMAND",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
        };
        f.write_str(name)
    }
}

impl RegisterError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        RegisterError {
            code,
            message: message.into(),
        }
    }

    pub fn bad_command(message: impl Into<String>) -> Self {
        RegisterError::new(ErrorCode::BadCommand, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        RegisterError::new(ErrorCode::ConfigError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        RegisterError::new(ErrorCode::StorageError, message)
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        RegisterError::new(ErrorCode::NotFound, format!("{} not found: {}", what, id))
    }
}

/// Converts engine errors.
impl From<CoreError> for RegisterError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(barcode) => RegisterError::not_found("Item", &barcode),
            CoreError::InsufficientStock {
                name,
                available,
                requested,
                ..
            } => RegisterError::new(
                ErrorCode::InsufficientStock,
                format!("Only {} left of {} (you asked for {})", available, name, requested),
            ),
            CoreError::EmptyCart => RegisterError::new(ErrorCode::ValidationError, "Cart is empty"),
            CoreError::InvalidState { action, state } => RegisterError::new(
                ErrorCode::InvalidState,
                format!("Cannot {} while {}", action, state),
            ),
            CoreError::CommitFailed(reason) => {
                tracing::error!(%reason, "Commit failed");
                RegisterError::new(
                    ErrorCode::CommitFailed,
                    format!("Not saved, nothing was changed: {}", reason),
                )
            }
            err @ CoreError::ResetFailed { .. } => {
                tracing::error!(error = %err, "Reset failed");
                RegisterError::new(ErrorCode::ResetFailed, format!("{}. Run wipe again to retry.", err))
            }
            CoreError::Validation(e) => RegisterError::new(ErrorCode::ValidationError, e.to_string()),
        }
    }
}

/// Bad arguments that fail a core parser (mode, window, amount).
impl From<ValidationError> for RegisterError {
    fn from(err: ValidationError) -> Self {
        RegisterError::from(CoreError::Validation(err))
    }
}

/// Converts sink errors raised outside the engine (initial load, reload).
impl From<SinkError> for RegisterError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::ReadFailed(reason) => {
                RegisterError::storage(format!("Could not load the store: {}", reason))
            }
            other => RegisterError::from(CoreError::from(other)),
        }
    }
}

/// Converts storage errors raised while opening the backend.
impl From<DbError> for RegisterError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RegisterError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                RegisterError::storage("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                RegisterError::storage("Database migration failed")
            }
            DbError::Serialization(e) => {
                RegisterError::storage(format!("Snapshot file is not valid: {}", e))
            }
            other => RegisterError::storage(other.to_string()),
        }
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RegisterError {}

pub type RegisterResult<T> = Result<T, RegisterError>;
