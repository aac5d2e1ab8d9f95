//! # Category Repository
//!
//! Store operations for category records.

use async_trait::async_trait;
use keeper_core::Category;

use crate::error::StoreResult;
use crate::patch::CategoryPatch;

/// Category collection contract, scoped per shop.
///
/// ## Usage
/// ```rust,ignore
/// // All roots
/// let roots = store.list_children(shop_id, None).await?;
///
/// // Rename + rebuilt path in one merge write
/// store.update_category(shop_id, id, CategoryPatch {
///     name: Some(new_name),
///     ..Default::default()
/// }).await?;
/// ```
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Fetches one category by id.
    async fn get_category(&self, shop_id: &str, category_id: &str)
        -> StoreResult<Option<Category>>;

    /// Lists every category of the shop.
    async fn list_categories(&self, shop_id: &str) -> StoreResult<Vec<Category>>;

    /// Lists direct children of `parent_id` (`None` = roots).
    ///
    /// This is the parent-filter query behind the leaf check: a category
    /// with no children here is a leaf.
    async fn list_children(
        &self,
        shop_id: &str,
        parent_id: Option<&str>,
    ) -> StoreResult<Vec<Category>>;

    /// Creates a category record.
    async fn create_category(&self, shop_id: &str, category: Category) -> StoreResult<()>;

    /// Partial-merge update; returns the record after the merge.
    async fn update_category(
        &self,
        shop_id: &str,
        category_id: &str,
        patch: CategoryPatch,
    ) -> StoreResult<Category>;

    /// Deletes the category record only.
    ///
    /// Children and items are NOT cascaded; orphans surface at the tree
    /// root until cleaned up.
    async fn delete_category(&self, shop_id: &str, category_id: &str) -> StoreResult<()>;
}
