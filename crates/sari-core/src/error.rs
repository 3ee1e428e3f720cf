//! # Error Types
//!
//! Domain-specific error types for sari-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sari-core errors (this file)                                          │
//! │  ├── CoreError        - Scan / cart / checkout failures                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sari-core sink errors (sink.rs)                                       │
//! │  └── SinkError        - Persistence target failures                    │
//! │                                                                         │
//! │  sari-db errors (separate crate)                                       │
//! │  └── DbError          - SQLite / snapshot file failures                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RegisterError → Operator message  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: the register reports it and returns the
//! session to a stable scanning state.

use thiserror::Error;

use crate::types::Collection;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Scanned barcode is not registered in the catalog.
    ///
    /// ## When This Occurs
    /// - CHECK mode scan of an unknown barcode
    /// - SELL mode scan of an item that must be registered in ADD mode first
    /// - Checkout of a cart line whose item was deleted after scanning
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Requested quantity exceeds the units on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Stock: 5, cart already holds 3
    ///      │
    ///      ▼
    /// Scan again, enter qty 3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 5, requested: 6 }
    ///      │
    ///      ▼
    /// Cart still shows 3
    /// ```
    #[error("Insufficient stock for {name} ({barcode}): available {available}, requested {requested}")]
    InsufficientStock {
        barcode: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Checkout was requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The session is not in a state that accepts the requested action.
    #[error("Cannot {action} while {state}")]
    InvalidState { action: String, state: String },

    /// The commit sink rejected the write. Nothing was persisted.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// A bulk wipe stopped before every collection was cleared.
    #[error("Reset failed on {failed} after clearing {cleared:?}: {reason}")]
    ResetFailed {
        cleared: Vec<Collection>,
        failed: Collection,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidState error.
    pub fn invalid_state(action: impl Into<String>, state: impl std::fmt::Display) -> Self {
        CoreError::InvalidState {
            action: action.into(),
            state: state.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by form parsing and quantity/discount checks before any business
/// logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., "abc" typed into a price field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            barcode: "4800016644290".to_string(),
            name: "Lucky Me Pancit Canton".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Lucky Me Pancit Canton (4800016644290): available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_reset_failed_lists_cleared_collections() {
        let err = CoreError::ResetFailed {
            cleared: vec![Collection::Inventory],
            failed: Collection::Sales,
            reason: "disk full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Reset failed on sales after clearing [Inventory]: disk full"
        );
    }
}
