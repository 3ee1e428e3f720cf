//! # Validation Module
//!
//! Input validation for scan events and operator forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register input adapter                                       │
//! │  └── Raw strings from the scanner / keypad                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Barcode trimming                                                  │
//! │  ├── Quantity / amount parsing                                         │
//! │  └── Discount bounds                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage                                                      │
//! │  └── CHECK (qty >= 0), NOT NULL, PRIMARY KEY                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest barcode accepted from a scanner.
pub const MAX_BARCODE_LEN: usize = 128;

/// Longest item name or expense title.
pub const MAX_NAME_LEN: usize = 200;

/// Most units a single item can be stocked at.
pub const MAX_STOCK_LEVEL: i64 = 1_000_000;

/// Largest typed amount (price, cost, discount, expense): ₱100,000,000.
///
/// With `MAX_STOCK_LEVEL` this keeps `price × qty` far inside i64.
pub const MAX_AMOUNT: Money = Money::from_pesos(100_000_000);

// =============================================================================
// String Validators
// =============================================================================

/// Normalizes a decoded scan.
///
/// Scanners append whitespace or line breaks; the trimmed value is what the
/// catalog is keyed on.
///
/// ## Example
/// ```rust
/// use sari_core::validation::normalize_barcode;
///
/// assert_eq!(normalize_barcode("  4800016644290\r\n").unwrap(), "4800016644290");
/// assert!(normalize_barcode("   ").is_err());
/// ```
pub fn normalize_barcode(raw: &str) -> ValidationResult<String> {
    let barcode = raw.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.chars().count() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    Ok(barcode.to_string())
}

/// Validates and trims a required text field (item name, expense title).
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Parses a quantity typed on the keypad.
///
/// ## Example
/// ```rust
/// use sari_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 3 ").unwrap(), 3);
/// assert!(parse_quantity("0").is_err());
/// assert!(parse_quantity("two").is_err());
/// ```
pub fn parse_quantity(input: &str) -> ValidationResult<i64> {
    let qty = input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "expected a whole number".to_string(),
        })?;

    validate_quantity(qty)?;
    Ok(qty)
}

/// Parses a stock level (units on hand). Blank means zero.
pub fn parse_stock_level(input: &str) -> ValidationResult<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }

    let qty = input
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "qty".to_string(),
            reason: "expected a whole number".to_string(),
        })?;

    if !(0..=MAX_STOCK_LEVEL).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 0,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(qty)
}

/// Parses an optional money field (cost, price). Blank means zero.
pub fn parse_optional_money(field: &str, input: &str) -> ValidationResult<Money> {
    if input.trim().is_empty() {
        return Ok(Money::zero());
    }

    let amount = input.parse::<Money>().map_err(|err| match err {
        ValidationError::InvalidFormat { reason, .. } => ValidationError::InvalidFormat {
            field: field.to_string(),
            reason,
        },
        other => other,
    })?;
    check_amount_cap(field, amount)
}

/// Parses an expense amount. Must be present and positive.
pub fn parse_expense_amount(input: &str) -> ValidationResult<Money> {
    let amount = input.parse::<Money>()?;
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    check_amount_cap("amount", amount)
}

fn check_amount_cap(field: &str, amount: Money) -> ValidationResult<Money> {
    if amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT.centavos(),
        });
    }
    Ok(amount)
}

/// Validates a cart-level discount against the cart subtotal.
///
/// ## Rules
/// - Must be non-negative
/// - Must not exceed the subtotal (a grand total never goes negative)
///
/// ## Example
/// ```rust
/// use sari_core::money::Money;
/// use sari_core::validation::validate_discount;
///
/// let subtotal = Money::from_pesos(200);
/// assert!(validate_discount(Money::from_pesos(20), subtotal).is_ok());
/// assert!(validate_discount(Money::from_pesos(201), subtotal).is_err());
/// assert!(validate_discount(Money::from_centavos(-1), subtotal).is_err());
/// ```
pub fn validate_discount(discount: Money, subtotal: Money) -> ValidationResult<()> {
    if discount.is_negative() || discount > subtotal {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: subtotal.centavos().max(0),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
