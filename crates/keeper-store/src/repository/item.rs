//! # Item Repository
//!
//! Store operations for item records, including the one operation the
//! whole ledger design hangs on: the atomic transaction append.
//!
//! ## The Atomic Append
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              append_transaction(shop, category, item, txn)              │
//! │                                                                         │
//! │   ONE persistence operation writes BOTH:                               │
//! │     • stock_transactions ← log ∪ {txn}     (array-union append)        │
//! │     • stock              ← stock + txn.quantity  (increment)           │
//! │     • last_transaction_id / last_stock_update / updated_at             │
//! │                                                                         │
//! │   There is no window where the log and the cached total disagree       │
//! │   after a partial failure: either the whole write lands or none of     │
//! │   it does. Callers NEVER write stock through a merge patch.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use keeper_core::{Item, StockTransaction};

use crate::error::StoreResult;
use crate::patch::ItemPatch;

/// Item collection contract, scoped per shop and category.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetches one item by id under its category.
    async fn get_item(
        &self,
        shop_id: &str,
        category_id: &str,
        item_id: &str,
    ) -> StoreResult<Option<Item>>;

    /// Lists the items of one category.
    async fn list_items(&self, shop_id: &str, category_id: &str) -> StoreResult<Vec<Item>>;

    /// Lists every item of the shop (tree building).
    async fn list_all_items(&self, shop_id: &str) -> StoreResult<Vec<Item>>;

    /// Creates an item record.
    ///
    /// Re-checks leaf-ness of the target category before writing; the
    /// store-side mirror of the UI's modal affordances. Fails with
    /// [`StoreError::NotALeaf`](crate::StoreError::NotALeaf) otherwise.
    async fn create_item(&self, shop_id: &str, item: Item) -> StoreResult<()>;

    /// Partial-merge update; returns the record after the merge.
    ///
    /// Ledger fields are not patchable; see [`append_transaction`].
    ///
    /// [`append_transaction`]: ItemStore::append_transaction
    async fn update_item(
        &self,
        shop_id: &str,
        category_id: &str,
        item_id: &str,
        patch: ItemPatch,
    ) -> StoreResult<Item>;

    /// Appends a ledger entry and increments the cached stock in one
    /// atomic persistence operation. Returns the item after the write.
    ///
    /// On failure the record is untouched; the caller leaves its local
    /// cache alone too (no optimistic update).
    async fn append_transaction(
        &self,
        shop_id: &str,
        category_id: &str,
        item_id: &str,
        txn: StockTransaction,
    ) -> StoreResult<Item>;

    /// Deletes one item record.
    async fn delete_item(&self, shop_id: &str, category_id: &str, item_id: &str)
        -> StoreResult<()>;
}
