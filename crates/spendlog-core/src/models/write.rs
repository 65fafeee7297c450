use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use time::Date;

/// Categories offered by the entry form. Storage accepts any text.
pub const SUGGESTED_CATEGORIES: [&str; 7] =
    ["General", "Food", "Travel", "Bills", "Health", "Shopping", "Other"];

/// Payment modes offered by the entry form. Storage accepts any text.
pub const SUGGESTED_MODES: [&str; 5] = ["Cash", "Card", "UPI", "Net Banking", "Other"];

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_MODE: &str = "Cash";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("payee is required")]
    MissingPayee,
    #[error("description is required")]
    MissingDescription,
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
}

/// An expense waiting to be persisted; the backend assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateExpenseCommand {
    pub date: Date,
    pub payee: Arc<str>,
    pub description: Arc<str>,
    pub category: Arc<str>,
    pub amount: Decimal,
    pub mode: Arc<str>,
}

impl CreateExpenseCommand {
    /// Rejects an empty payee or description and any amount that is not strictly
    /// positive. Category and mode are free text and are never rejected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.payee.is_empty() {
            return Err(ValidationError::MissingPayee);
        }
        if self.description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::Month;

    fn command(payee: &str, description: &str, amount: Decimal) -> CreateExpenseCommand {
        CreateExpenseCommand {
            date: Date::from_calendar_date(2024, Month::January, 5).unwrap(),
            payee: Arc::from(payee),
            description: Arc::from(description),
            category: Arc::from(DEFAULT_CATEGORY),
            amount,
            mode: Arc::from(DEFAULT_MODE),
        }
    }

    #[test]
    fn test_accepts_complete_expense() {
        assert_eq!(command("Landlord", "Rent", dec!(1200)).validate(), Ok(()));
        assert_eq!(command("Cafe", "Coffee", dec!(0.01)).validate(), Ok(()));
    }

    #[test]
    fn test_rejects_missing_fields() {
        assert_eq!(
            command("", "Rent", dec!(10)).validate(),
            Err(ValidationError::MissingPayee)
        );
        assert_eq!(
            command("Landlord", "", dec!(10)).validate(),
            Err(ValidationError::MissingDescription)
        );
    }

    #[test]
    fn test_rejects_zero_and_negative_amounts() {
        assert_eq!(
            command("Landlord", "Rent", Decimal::ZERO).validate(),
            Err(ValidationError::NonPositiveAmount(Decimal::ZERO))
        );
        assert_eq!(
            command("Landlord", "Rent", dec!(-5)).validate(),
            Err(ValidationError::NonPositiveAmount(dec!(-5)))
        );
    }

    #[test]
    fn test_free_text_category_and_mode_are_accepted() {
        let mut cmd = command("Market", "Groceries", dec!(42.50));
        cmd.category = Arc::from("Groceries and more");
        cmd.mode = Arc::from("Barter");
        assert!(!SUGGESTED_CATEGORIES.contains(&cmd.category.as_ref()));
        assert!(!SUGGESTED_MODES.contains(&cmd.mode.as_ref()));
        assert_eq!(cmd.validate(), Ok(()));
    }
}
