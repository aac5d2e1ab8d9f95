//! # Store Error Types
//!
//! Error types for document-store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Store SDK / network failure                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in shopfront) ← serialized for the UI                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI displays user-friendly message; local cache stays at               │
//! │  last-known-good (no optimistic writes)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Document-store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    ///
    /// ## When This Occurs
    /// - Id doesn't exist in the collection
    /// - Item looked up under the wrong category
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Item creation attempted under a non-leaf category.
    ///
    /// The UI already hides "add item" on nodes with subcategories; this
    /// is the store-side mirror of that check.
    #[error("Category {category_id} has subcategories; items attach only to leaf categories")]
    NotALeaf { category_id: String },

    /// A write (create/update/delete/append) failed at the backend.
    ///
    /// ## When This Occurs
    /// - Network failure mid-request
    /// - Store rejected the write
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// A read/query failed at the backend.
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// The live-change subscription dropped.
    #[error("Change subscription closed")]
    SubscriptionClosed,

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::not_found("Item", "item-9");
        assert_eq!(err.to_string(), "Item not found: item-9");

        let err = StoreError::NotALeaf {
            category_id: "cat-3".to_string(),
        };
        assert!(err.to_string().contains("leaf"));
    }
}
