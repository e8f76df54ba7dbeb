use rust_decimal::Decimal;

use crate::backend::domain::error::LedgerError;
use crate::backend::domain::optimistic::Identified;

/// A spending category with its default rollover behaviour.
///
/// Monthly limits and spend are not stored here; they come from the budget
/// overlay and the transaction list.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub group: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub rollover: bool,
    /// `None` keeps the surplus in this category
    pub rollover_target_category_id: Option<String>,
    /// Static default limit, used when a month has no overlay entry
    pub default_limit: Decimal,
}

impl Category {
    /// Category that receives this category's surplus when rollover is on
    pub fn rollover_destination(&self) -> Option<&str> {
        if !self.rollover {
            return None;
        }
        Some(
            self.rollover_target_category_id
                .as_deref()
                .unwrap_or(self.id.as_str()),
        )
    }
}

impl Identified for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CategoryValidationError {
    #[error("Category name cannot be empty")]
    EmptyName,
    #[error("Default limit cannot be negative")]
    NegativeDefaultLimit,
}

impl From<CategoryValidationError> for LedgerError {
    fn from(error: CategoryValidationError) -> Self {
        LedgerError::Validation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn category(rollover: bool, target: Option<&str>) -> Category {
        Category {
            id: "cat-9".to_string(),
            name: "Groceries".to_string(),
            group: None,
            icon: None,
            color: None,
            rollover,
            rollover_target_category_id: target.map(str::to_string),
            default_limit: dec!(500),
        }
    }

    #[test]
    fn test_rollover_destination() {
        assert_eq!(category(false, Some("cat-1")).rollover_destination(), None);
        assert_eq!(category(true, None).rollover_destination(), Some("cat-9"));
        assert_eq!(category(true, Some("cat-1")).rollover_destination(), Some("cat-1"));
    }
}
