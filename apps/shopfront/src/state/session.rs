//! # Item Session State
//!
//! The explicit session object behind the category/item overlays: the
//! currently open item's cache, the overlay and capture state machines,
//! the edit buffer, and the in-flight save guard.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session Ownership                                   │
//! │                                                                         │
//! │  One SessionState per shop screen. Opening a different item REPLACES   │
//! │  the cached item wholesale (never merges); closing the overlay resets  │
//! │  the session to its initial value.                                     │
//! │                                                                         │
//! │  Flows lock, transition/read, and release BEFORE awaiting any I/O;     │
//! │  they re-lock to commit results. The lock never spans an await.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use keeper_core::{CaptureSequencer, Item, Money, Overlay, MAX_ITEM_IMAGES};

// =============================================================================
// Item Context
// =============================================================================

/// The open item plus the path that locates its record.
#[derive(Debug, Clone)]
pub struct ItemContext {
    pub category_id: String,
    pub item_id: String,
    /// Read/write-through cache of the record; replaced wholesale when a
    /// different item opens.
    pub item: Item,
}

// =============================================================================
// Edit Buffer
// =============================================================================

/// Raw field text while item detail is in edit mode. Nothing persists
/// until edit mode is left, at which point everything does.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    pub name: String,
    pub buy_price: String,
    pub sell_price: String,
}

impl EditBuffer {
    /// Seeds the buffer from the cached item.
    pub fn from_item(item: &Item) -> Self {
        let price_text = |p: Option<Money>| p.map(|m| m.to_string()).unwrap_or_default();
        EditBuffer {
            name: item.name.clone(),
            buy_price: price_text(item.buy_price),
            sell_price: price_text(item.sell_price),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Everything the open overlay owns.
#[derive(Debug, Default)]
pub struct Session {
    pub overlay: Overlay,
    pub capture: CaptureSequencer,
    pub current: Option<ItemContext>,
    pub edit: Option<EditBuffer>,

    /// Per-slot preview source: the local bytes reference while an upload
    /// runs, swapped for the durable URL once persisted.
    pub previews: [Option<String>; MAX_ITEM_IMAGES],

    /// Disabled-button guard for the save action.
    pub save_in_flight: bool,
}

impl Session {
    /// Resets everything the item detail owned (overlay close path).
    pub fn clear_item(&mut self) {
        self.current = None;
        self.edit = None;
        self.previews = Default::default();
        self.capture = CaptureSequencer::default();
        self.save_in_flight = false;
    }
}

// =============================================================================
// Shared Handle
// =============================================================================

/// Shared session handle.
///
/// ## Thread Safety
/// `Arc<Mutex<Session>>`: flows run on the async runtime but every lock
/// section is short and never crosses an await.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<Session>>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Executes a function with read access to the session.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let session = self.inner.lock().expect("Session mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.inner.lock().expect("Session mutex poisoned");
        f(&mut session)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> Item {
        Item {
            id: "item-1".to_string(),
            name: name.to_string(),
            category_id: "cat-1".to_string(),
            ancestors: vec![],
            full_path: name.to_string(),
            images: vec![],
            buy_price: Some(Money::from_cents(180)),
            sell_price: None,
            stock: 0,
            stock_transactions: vec![],
            last_transaction_id: None,
            last_stock_update: None,
            created_at: 0,
            updated_at: None,
        }
    }

    #[test]
    fn test_edit_buffer_seeds_from_item() {
        let buffer = EditBuffer::from_item(&item("Bread"));
        assert_eq!(buffer.name, "Bread");
        assert_eq!(buffer.buy_price, "1.80");
        assert_eq!(buffer.sell_price, "");
    }

    #[test]
    fn test_clear_item_resets_everything() {
        let state = SessionState::new();
        state.with_mut(|s| {
            s.current = Some(ItemContext {
                category_id: "cat-1".to_string(),
                item_id: "item-1".to_string(),
                item: item("Bread"),
            });
            s.edit = Some(EditBuffer::default());
            s.previews[0] = Some("local:photo.jpg".to_string());
            s.save_in_flight = true;
        });

        state.with_mut(|s| s.clear_item());

        state.with(|s| {
            assert!(s.current.is_none());
            assert!(s.edit.is_none());
            assert!(s.previews[0].is_none());
            assert!(!s.save_in_flight);
        });
    }
}
