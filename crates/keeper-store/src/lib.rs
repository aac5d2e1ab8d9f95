//! # keeper-store: Document-Store Contract for Keeper
//!
//! This crate holds the narrow contract Keeper keeps against the external
//! document database, and an in-memory reference implementation of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Keeper Data Flow                                 │
//! │                                                                         │
//! │  Flow (add_stock, save_edits, rename_category)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   keeper-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌──────────────┐   ┌─────────────────┐  │   │
//! │  │   │ Repository     │   │   Patches    │   │  Change Feed    │  │   │
//! │  │   │ traits         │   │ (partial     │   │  (broadcast of  │  │   │
//! │  │   │ Category/Item/ │   │  merge       │   │   writes, tree  │  │   │
//! │  │   │ Shop           │   │  updates)    │   │   refresh)      │  │   │
//! │  │   └────────────────┘   └──────────────┘   └─────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   MemoryStore: reference impl behind one RwLock                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Managed document store (external service; production adapter          │
//! │  binds its SDK to these traits)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`repository`] - the per-entity trait contract
//! - [`patch`] - typed partial-merge updates
//! - [`event`] - live-change subscription types
//! - [`memory`] - in-memory reference implementation
//! - [`error`] - store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use keeper_store::{DocumentStore, MemoryStore};
//!
//! let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
//! let mut feed = store.watch();
//! let roots = store.list_children(shop_id, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod event;
pub mod memory;
pub mod patch;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use event::{ChangeKind, StoreEvent, StoreEvents};
pub use memory::MemoryStore;
pub use patch::{CategoryPatch, ItemPatch};
pub use repository::{CategoryStore, ItemStore, ShopStore};

// =============================================================================
// Facade Trait
// =============================================================================

/// The full document-store surface: every repository plus the change feed.
///
/// Flows hold an `Arc<dyn DocumentStore>` so tests can swap the backing
/// freely.
pub trait DocumentStore: CategoryStore + ItemStore + ShopStore {
    /// Subscribes to the live change feed (the store-side push that keeps
    /// the category tree fresh).
    fn watch(&self) -> StoreEvents;
}
