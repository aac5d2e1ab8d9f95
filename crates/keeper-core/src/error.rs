//! # Error Types
//!
//! Domain-specific error types for keeper-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  keeper-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── IntegrityFault   - Ledger-vs-cache divergence (warning grade)     │
//! │                                                                         │
//! │  keeper-store errors (separate crate)                                  │
//! │  └── StoreError       - Document-store operation failures              │
//! │                                                                         │
//! │  Shopfront errors (in app)                                             │
//! │  └── AppError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → AppError → UI        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, quantity, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::capture::CapturePhase;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found in the current category.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Category cannot be found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Items may only be attached to leaf categories.
    ///
    /// ## When This Occurs
    /// - "Add item" on a category that has subcategory children
    /// - The store-side re-check before item creation fails
    #[error("Category {category_id} has subcategories; items attach only to leaf categories")]
    NotALeafCategory { category_id: String },

    /// Subcategories may not be added under a category that holds items.
    #[error("Category {category_id} holds items; it cannot take subcategories")]
    CategoryHoldsItems { category_id: String },

    /// A record with the same (trimmed, case-folded) name already exists.
    ///
    /// Carries the existing record's id so the caller can offer
    /// rename-instead, the way the capture UI does.
    #[error("{kind} named '{name}' already exists")]
    DuplicateName {
        kind: &'static str,
        name: String,
        existing_id: String,
    },

    /// The item-detail overlay cannot close while a capture is in flight.
    ///
    /// ## When This Occurs
    /// - Close requested while the sequencer is in a processing phase
    ///   (photo 1 or photo 2 upload still running)
    #[error("Finish image capture first (phase {phase:?})")]
    CaptureInProgress { phase: CapturePhase },

    /// A capture step was requested from a phase that does not allow it.
    #[error("Capture step not allowed from phase {phase:?}")]
    InvalidCapturePhase { phase: CapturePhase },

    /// An overlay transition was requested from the wrong state.
    #[error("Overlay is {state}; cannot {action}")]
    InvalidOverlayState {
        state: &'static str,
        action: &'static str,
    },

    /// The image slot index is outside the two-photo contract.
    #[error("Image slot {0} is out of range (items carry at most 2 photos)")]
    ImageSlotOutOfRange(usize),

    /// The sales cart is empty at checkout.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unparseable price, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Integrity Fault
// =============================================================================

/// Ledger integrity fault: the cached stock total and the sum of the
/// transaction log disagree.
///
/// This is warning-grade, not an error the UI blocks on: the audit runs
/// after every append and the caller logs the fault and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stock mismatch on item {item_id}: cached {cached}, ledger sum {computed}")]
pub struct IntegrityFault {
    pub item_id: String,
    pub cached: i64,
    pub computed: i64,
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
        let err = CoreError::NotALeafCategory {
            category_id: "cat-7".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Category cat-7 has subcategories; items attach only to leaf categories"
        );

        let err = CoreError::CaptureInProgress {
            phase: CapturePhase::ProcessingImage1,
        };
        assert!(err.to_string().contains("Finish image capture first"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_integrity_fault_display() {
        let fault = IntegrityFault {
            item_id: "item-1".to_string(),
            cached: 10,
            computed: 8,
        };
        assert_eq!(
            fault.to_string(),
            "stock mismatch on item item-1: cached 10, ledger sum 8"
        );
    }
}
