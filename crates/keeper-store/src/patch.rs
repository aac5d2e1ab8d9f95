//! # Partial-Merge Patches
//!
//! The document store updates with merge semantics: only the fields a
//! write names are touched. These typed patches are the Rust rendition of
//! that; `None` fields are left alone, `Some` fields overwrite.
//!
//! Struct-update syntax keeps call sites readable:
//! ```rust,ignore
//! store.update_item(shop, cat, id, ItemPatch {
//!     buy_price: Some(buy),
//!     sell_price: Some(sell),
//!     updated_at: Some(now_ms),
//!     ..Default::default()
//! }).await?;
//! ```

use keeper_core::{Money, PathSegment};

/// Partial update for a category record.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub ancestors: Option<Vec<PathSegment>>,
    pub full_path: Option<String>,
    pub updated_at: Option<i64>,
}

/// Partial update for an item record.
///
/// Ledger fields (`stock`, `stock_transactions`, …) are absent: stock mutates exclusively through
/// [`append_transaction`](crate::repository::ItemStore::append_transaction),
/// never through a merge write.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub ancestors: Option<Vec<PathSegment>>,
    pub full_path: Option<String>,
    pub images: Option<Vec<String>>,
    pub buy_price: Option<Money>,
    pub sell_price: Option<Money>,
    pub updated_at: Option<i64>,
}

impl ItemPatch {
    /// True when the patch changes nothing (guards pointless writes).
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ancestors.is_none()
            && self.full_path.is_none()
            && self.images.is_none()
            && self.buy_price.is_none()
            && self.sell_price.is_none()
            && self.updated_at.is_none()
    }
}
