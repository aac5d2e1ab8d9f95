//! # Shop Repository
//!
//! The shop root record holds little beyond the display name, but the
//! name drives the first-run bootstrap: a signed-in shop without one is
//! prompted, and the answer persists with merge semantics so nothing
//! else on the record is disturbed.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Shop root-record contract.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// The shop's stored display name, if one was ever set.
    async fn get_shop_name(&self, shop_id: &str) -> StoreResult<Option<String>>;

    /// Sets the display name (merge write; the rest of the record stays).
    async fn set_shop_name(&self, shop_id: &str, name: &str) -> StoreResult<()>;
}
