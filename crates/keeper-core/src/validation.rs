//! # Validation Module
//!
//! Input validation utilities for Keeper.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI prompts/fields                                            │
//! │  ├── Basic format checks (empty, numeric)                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (business rule validation)                       │
//! │  ├── Names, quantities, prices, duplicate keys                         │
//! │  └── Runs before any store write - a rejection leaves no partial state │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store contract (leaf re-check before item creation)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::Item;
use crate::{MAX_ITEM_IMAGES, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a category/item/shop display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Duplicate-detection key: trimmed and case-folded.
///
/// "Fresh Bread" and "  fresh bread " are the same record as far as
/// duplicate checks go.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a user-entered quantity (restock prompt, sale quantity).
///
/// ## Rules
/// - Must be positive (≥ 1)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Parses a user-entered quantity string ("how many units?").
///
/// Free text from a prompt: trimmed, must parse as an integer, then the
/// numeric rules above apply.
pub fn parse_quantity(text: &str) -> ValidationResult<i64> {
    let qty: i64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "not a whole number".to_string(),
        })?;
    validate_quantity(qty)?;
    Ok(qty)
}

/// Validates a price in cents.
///
/// Zero is allowed; missing numeric fields coerce to zero on save.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Item Payload Validators
// =============================================================================

/// Checks an item is complete enough for the embedder push: both photos
/// and both prices must be present.
pub fn validate_embedder_ready(item: &Item) -> ValidationResult<()> {
    if item.images.len() < MAX_ITEM_IMAGES {
        return Err(ValidationError::Required {
            field: "images".to_string(),
        });
    }

    if item.buy_price.is_none() || item.sell_price.is_none() {
        return Err(ValidationError::Required {
            field: "prices".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Fresh Bread ").unwrap(), "Fresh Bread");
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_name_key_folds_case_and_whitespace() {
        assert_eq!(name_key("  Fresh Bread "), "fresh bread");
        assert_eq!(name_key("FRESH BREAD"), name_key("fresh bread"));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(" 10 ").unwrap(), 10);
        assert!(parse_quantity("ten").is_err());
        assert!(parse_quantity("2.5").is_err());
        assert!(parse_quantity("0").is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_embedder_ready() {
        let mut item = Item {
            id: "i".to_string(),
            name: "Bread".to_string(),
            category_id: "c".to_string(),
            ancestors: vec![],
            full_path: "Bread".to_string(),
            images: vec!["u0".to_string()],
            buy_price: None,
            sell_price: None,
            stock: 0,
            stock_transactions: vec![],
            last_transaction_id: None,
            last_stock_update: None,
            created_at: 0,
            updated_at: None,
        };

        assert!(validate_embedder_ready(&item).is_err());

        item.images.push("u1".to_string());
        assert!(validate_embedder_ready(&item).is_err());

        item.buy_price = Some(Money::from_cents(100));
        item.sell_price = Some(Money::from_cents(150));
        assert!(validate_embedder_ready(&item).is_ok());
    }
}
