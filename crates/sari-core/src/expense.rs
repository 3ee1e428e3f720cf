//! Expense entry and editing.
//!
//! Expenses are created and changed directly by the operator; the checkout
//! engine never writes them.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::ExpenseRecord;
use crate::validation::{parse_expense_amount, validate_required_text, ValidationResult};

/// Builds a new expense dated `date`.
pub fn new_expense(title: &str, amount: &str, date: NaiveDate) -> ValidationResult<ExpenseRecord> {
    Ok(ExpenseRecord {
        id: Uuid::new_v4().to_string(),
        title: validate_required_text("title", title)?,
        amount_centavos: parse_expense_amount(amount)?.centavos(),
        date,
    })
}

/// Applies an edit. Only the title and amount change; the date is kept.
pub fn edit_expense(existing: &ExpenseRecord, title: &str, amount: &str) -> ValidationResult<ExpenseRecord> {
    Ok(ExpenseRecord {
        id: existing.id.clone(),
        title: validate_required_text("title", title)?,
        amount_centavos: parse_expense_amount(amount)?.centavos(),
        date: existing.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    #[test]
    fn test_new_expense() {
        let expense = new_expense("  Kuryente ", "1,250.50", day()).unwrap();
        assert_eq!(expense.title, "Kuryente");
        assert_eq!(expense.amount(), Money::from_centavos(125050));
        assert_eq!(expense.date, day());
        assert!(Uuid::parse_str(&expense.id).is_ok());

        assert!(new_expense("", "10", day()).is_err());
        assert!(new_expense("Tubig", "0", day()).is_err());
    }

    #[test]
    fn test_edit_keeps_id_and_date() {
        let original = new_expense("Renta", "3000", day()).unwrap();
        let edited = edit_expense(&original, "Renta (Feb)", "3500").unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.date, original.date);
        assert_eq!(edited.amount(), Money::from_pesos(3500));
    }
}
