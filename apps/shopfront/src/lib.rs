//! # keeper-shopfront: Session & Flow Orchestration
//!
//! The orchestration layer over the Keeper library crates. Each user
//! gesture maps to one flow function; each flow validates, persists,
//! then mutates session state; never the other way around.
//!
//! ## Surfaces and their sessions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Runtime Shape                                    │
//! │                                                                         │
//! │  AppContext (one per signed-in shop)                                   │
//! │  ├── SessionState  - category/item overlay: item cache, overlay SM,   │
//! │  │                   capture SM, edit buffer                           │
//! │  ├── SalesState    - scanning camera: cart, pending match, guards     │
//! │  ├── Arc<dyn DocumentStore>   - categories/items/shop records          │
//! │  ├── NotifierHandle           - queued fire-and-forget embeddings      │
//! │  └── Arc<dyn ...> ports       - camera, image host, recognizer,        │
//! │                                 embedder, identity                     │
//! │                                                                         │
//! │  flows::catalog      tree, CRUD, rename cascade, shop-name bootstrap  │
//! │  flows::item_detail  open/close, edit/save, stock, price-ensure       │
//! │  flows::capture      the two-photo intake                             │
//! │  flows::sales        scan → cart → checkout → receipt                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod flows;
pub mod state;

#[cfg(test)]
mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{AppError, AppResult, ErrorCode};
pub use flows::capture::{CameraPort, CaptureStep};
pub use flows::catalog::{ItemOpenHandler, TreeBrowser};
pub use flows::item_detail::{DetailPrompt, OpenedItem, StockAdded};
pub use flows::sales::{CartView, CheckoutFailure, CheckoutOutcome};
pub use state::{SalesState, SessionState};

use std::sync::Arc;

use keeper_backend::{
    IdentityProvider, ImageHost, ItemEmbedder, NotifierHandle, Recognizer,
};
use keeper_core::ShopIdentity;
use keeper_store::{DocumentStore, ShopStore};

// =============================================================================
// App Context
// =============================================================================

/// Everything the flows need, wired once per signed-in shop.
///
/// All ports are trait objects so tests can substitute stubs; the two
/// session handles are cheap clones of shared state.
pub struct AppContext {
    pub shop: ShopIdentity,
    pub store: Arc<dyn DocumentStore>,
    pub session: SessionState,
    pub sales: SalesState,
    pub notifier: NotifierHandle,
    pub embedder: Arc<dyn ItemEmbedder>,
    pub image_host: Arc<dyn ImageHost>,
    pub camera: Arc<dyn CameraPort>,
    pub recognizer: Arc<dyn Recognizer>,
    pub identity: Arc<dyn IdentityProvider>,
}

// =============================================================================
// Session Bootstrap
// =============================================================================

/// What sign-in produced: the shop, and its stored display name if one
/// was ever set (`None` → the UI prompts and calls
/// [`flows::catalog::set_shop_name`]).
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub shop: ShopIdentity,
    pub shop_name: Option<String>,
}

/// Installs the global tracing subscriber (env-filtered, `info` default).
///
/// Call once at startup; a second call is a no-op so embedding hosts and
/// tests can both invoke it safely.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Resolves the signed-in shop and its display name.
///
/// No identity means the unauthenticated landing state; surfaced as a
/// typed error, never a guessed shop id.
pub async fn start_session(
    identity: &dyn IdentityProvider,
    store: &dyn DocumentStore,
) -> AppResult<SessionStart> {
    let shop = identity
        .current_shop()
        .await
        .ok_or_else(AppError::unauthenticated)?;

    let shop_name = store.get_shop_name(&shop.shop_id).await?;
    Ok(SessionStart { shop, shop_name })
}
