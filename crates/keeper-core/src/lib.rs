//! # keeper-core: Pure Business Logic for Keeper
//!
//! This crate is the **heart** of Keeper. It contains all business logic
//! as pure functions and state machines with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Keeper Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Browser Frontend                            │   │
//! │  │   Category Tree ──► Item Detail ──► Capture ──► Sales Camera   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  apps/shopfront (flows)                         │   │
//! │  │    open_item, add_stock, scan, checkout, rename_category       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ keeper-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐ │   │
//! │  │   │  types   │ │  ledger  │ │   cart   │ │ capture/overlay  │ │   │
//! │  │   │ Item     │ │ append + │ │ lines +  │ │  state machines  │ │   │
//! │  │   │ Category │ │  audit   │ │ receipt  │ │  + close guard   │ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORE • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        keeper-store (documents) / keeper-backend (HTTP)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Item, StockTransaction, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - Append-only stock ledger math and the integrity audit
//! - [`cart`] - Sales cart lines, totals, receipt artifact
//! - [`capture`] - Two-photo capture sequencer state machine
//! - [`overlay`] - Overlay stacking / edit toggle / close guard
//! - [`tree`] - Category tree paths, leaf checks, rename rebuild
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic given their inputs (callers pass
//!    the clock in; only id suffixes draw randomness)
//! 2. **No I/O**: store, network, camera access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capture;
pub mod cart;
pub mod error;
pub mod ledger;
pub mod money;
pub mod overlay;
pub mod tree;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use keeper_core::Money` instead of
// `use keeper_core::money::Money`

pub use capture::{CapturePhase, CaptureSequencer};
pub use cart::{Cart, CartLine, Receipt};
pub use error::{CoreError, IntegrityFault, ValidationError};
pub use money::Money;
pub use overlay::{DetailMode, Overlay, OverlayState};
pub use tree::CategoryTree;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Photos per item. The capture flow is built around exactly two slots,
/// and the recognition backend indexes embeddings by slot.
pub const MAX_ITEM_IMAGES: usize = 2;

/// Separator for denormalized category paths ("Drinks > Sodas > Cola").
pub const PATH_SEPARATOR: &str = " > ";

/// Maximum quantity accepted from a single quantity prompt.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Actor recorded on transactions when the identity provider supplies no
/// display name.
pub const DEFAULT_ACTOR: &str = "Staff";
