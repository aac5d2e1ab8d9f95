//! # Catalog Flow
//!
//! Category/item CRUD, duplicate-name detection, the rename path rebuild,
//! leaf enforcement, the shop-name bootstrap, and the tree browser that
//! stays fresh off the store's change feed.
//!
//! ## Rename Cascade
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rename_category("drinks", "Beverages")                                │
//! │                                                                         │
//! │  1. merge-write the new name onto the record                           │
//! │  2. fetch every category + item of the shop                            │
//! │  3. tree::rebuild_paths recomputes ancestors/full_path everywhere      │
//! │  4. persist exactly the records that changed                           │
//! │                                                                         │
//! │  Every descendant category and every item under them ends up with a    │
//! │  full_path that starts with the new name.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use keeper_core::{
    overlay::{modal_options, ModalOptions},
    tree, validation, Category, CategoryTree, CoreError, Item,
};
use keeper_store::{
    CategoryPatch, CategoryStore, DocumentStore, ItemPatch, ItemStore, ShopStore, StoreEvents,
};

use crate::error::{AppError, AppResult};
use crate::AppContext;

// =============================================================================
// Tree Loading
// =============================================================================

/// Builds a render-ready tree snapshot from the store.
pub async fn load_tree(ctx: &AppContext) -> AppResult<CategoryTree> {
    let categories = ctx.store.list_categories(&ctx.shop.shop_id).await?;
    let items = ctx.store.list_all_items(&ctx.shop.shop_id).await?;
    Ok(CategoryTree::build(&categories, &items))
}

/// Modal affordances for the selected node: leaf enforcement at the UI
/// layer.
pub async fn modal_options_for(ctx: &AppContext, category_id: &str) -> AppResult<ModalOptions> {
    let subcategories = ctx
        .store
        .list_children(&ctx.shop.shop_id, Some(category_id))
        .await?;
    let items = ctx.store.list_items(&ctx.shop.shop_id, category_id).await?;
    Ok(modal_options(subcategories.len(), items.len()))
}

// =============================================================================
// Duplicate Detection
// =============================================================================

/// Finds an existing category with the same trimmed, case-folded name.
async fn find_duplicate_category(
    ctx: &AppContext,
    name: &str,
) -> AppResult<Option<Category>> {
    let key = validation::name_key(name);
    let categories = ctx.store.list_categories(&ctx.shop.shop_id).await?;
    Ok(categories
        .into_iter()
        .find(|c| validation::name_key(&c.name) == key))
}

/// Finds an existing item in the category with the same folded name.
async fn find_duplicate_item(
    ctx: &AppContext,
    category_id: &str,
    name: &str,
) -> AppResult<Option<Item>> {
    let key = validation::name_key(name);
    let items = ctx.store.list_items(&ctx.shop.shop_id, category_id).await?;
    Ok(items
        .into_iter()
        .find(|i| validation::name_key(&i.name) == key))
}

// =============================================================================
// Creation
// =============================================================================

/// Creates a category (root when `parent_id` is `None`).
///
/// A duplicate name is refused with the existing record's id so the UI
/// can offer rename-instead. A parent that already holds items refuses
/// subcategories (leaf enforcement, the other direction).
pub async fn create_category(
    ctx: &AppContext,
    name: &str,
    parent_id: Option<&str>,
) -> AppResult<Category> {
    let name = validation::validate_name(name)?;

    if let Some(existing) = find_duplicate_category(ctx, &name).await? {
        return Err(CoreError::DuplicateName {
            kind: "Category",
            name,
            existing_id: existing.id,
        }
        .into());
    }

    let ancestors = match parent_id {
        Some(pid) => {
            let parent = ctx
                .store
                .get_category(&ctx.shop.shop_id, pid)
                .await?
                .ok_or_else(|| AppError::not_found("Category", pid))?;
            let items = ctx.store.list_items(&ctx.shop.shop_id, pid).await?;
            if !items.is_empty() {
                return Err(CoreError::CategoryHoldsItems {
                    category_id: pid.to_string(),
                }
                .into());
            }
            tree::child_ancestors(&parent)
        }
        None => Vec::new(),
    };

    let full_path = tree::join_path(&ancestors, &name);
    let category = Category {
        id: Uuid::new_v4().to_string(),
        name,
        parent_id: parent_id.map(String::from),
        ancestors,
        full_path,
        created_at: Utc::now().timestamp_millis(),
        updated_at: None,
    };

    ctx.store
        .create_category(&ctx.shop.shop_id, category.clone())
        .await?;
    info!(category_id = %category.id, path = %category.full_path, "category created");
    Ok(category)
}

/// Creates an item under a leaf category, initialized ledger-neutral
/// (`stock: 0`, empty log). The store re-checks leaf-ness on write.
pub async fn create_item(ctx: &AppContext, category_id: &str, name: &str) -> AppResult<Item> {
    let name = validation::validate_name(name)?;

    let category = ctx
        .store
        .get_category(&ctx.shop.shop_id, category_id)
        .await?
        .ok_or_else(|| AppError::not_found("Category", category_id))?;

    let subcategories = ctx
        .store
        .list_children(&ctx.shop.shop_id, Some(category_id))
        .await?;
    if !subcategories.is_empty() {
        return Err(CoreError::NotALeafCategory {
            category_id: category_id.to_string(),
        }
        .into());
    }

    if let Some(existing) = find_duplicate_item(ctx, category_id, &name).await? {
        return Err(CoreError::DuplicateName {
            kind: "Item",
            name,
            existing_id: existing.id,
        }
        .into());
    }

    let ancestors = tree::child_ancestors(&category);
    let full_path = tree::join_path(&ancestors, &name);
    let item = Item {
        id: Uuid::new_v4().to_string(),
        name,
        category_id: category_id.to_string(),
        ancestors,
        full_path,
        images: vec![],
        buy_price: None,
        sell_price: None,
        stock: 0,
        stock_transactions: vec![],
        last_transaction_id: None,
        last_stock_update: None,
        created_at: Utc::now().timestamp_millis(),
        updated_at: None,
    };

    ctx.store.create_item(&ctx.shop.shop_id, item.clone()).await?;
    info!(item_id = %item.id, path = %item.full_path, "item created");
    Ok(item)
}

// =============================================================================
// Rename + Path Rebuild
// =============================================================================

/// Renames a category and rewrites the denormalized paths of every
/// descendant category and item.
pub async fn rename_category(ctx: &AppContext, category_id: &str, new_name: &str) -> AppResult<()> {
    let new_name = validation::validate_name(new_name)?;
    let now_ms = Utc::now().timestamp_millis();

    ctx.store
        .update_category(
            &ctx.shop.shop_id,
            category_id,
            CategoryPatch {
                name: Some(new_name.clone()),
                updated_at: Some(now_ms),
                ..Default::default()
            },
        )
        .await?;

    let mut categories = ctx.store.list_categories(&ctx.shop.shop_id).await?;
    let mut items = ctx.store.list_all_items(&ctx.shop.shop_id).await?;
    let (changed_categories, changed_items) = tree::rebuild_paths(&mut categories, &mut items);

    for category in categories
        .iter()
        .filter(|c| changed_categories.contains(&c.id))
    {
        ctx.store
            .update_category(
                &ctx.shop.shop_id,
                &category.id,
                CategoryPatch {
                    ancestors: Some(category.ancestors.clone()),
                    full_path: Some(category.full_path.clone()),
                    updated_at: Some(now_ms),
                    ..Default::default()
                },
            )
            .await?;
    }

    for item in items.iter().filter(|i| changed_items.contains(&i.id)) {
        ctx.store
            .update_item(
                &ctx.shop.shop_id,
                &item.category_id,
                &item.id,
                ItemPatch {
                    ancestors: Some(item.ancestors.clone()),
                    full_path: Some(item.full_path.clone()),
                    updated_at: Some(now_ms),
                    ..Default::default()
                },
            )
            .await?;
    }

    info!(
        category_id,
        new_name,
        categories = changed_categories.len(),
        items = changed_items.len(),
        "rename cascade persisted"
    );
    Ok(())
}

/// Renames an item in place; its own full_path follows, ancestors stay.
pub async fn rename_item(
    ctx: &AppContext,
    category_id: &str,
    item_id: &str,
    new_name: &str,
) -> AppResult<Item> {
    let new_name = validation::validate_name(new_name)?;

    let existing = ctx
        .store
        .get_item(&ctx.shop.shop_id, category_id, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Item", item_id))?;

    let full_path = tree::join_path(&existing.ancestors, &new_name);
    let item = ctx
        .store
        .update_item(
            &ctx.shop.shop_id,
            category_id,
            item_id,
            ItemPatch {
                name: Some(new_name),
                full_path: Some(full_path),
                updated_at: Some(Utc::now().timestamp_millis()),
                ..Default::default()
            },
        )
        .await?;

    Ok(item)
}

/// Deletes the category record only. Children and items are not cascaded
/// (they surface as orphans until cleaned up).
pub async fn delete_category(ctx: &AppContext, category_id: &str) -> AppResult<()> {
    ctx.store
        .delete_category(&ctx.shop.shop_id, category_id)
        .await?;
    info!(category_id, "category deleted (no cascade)");
    Ok(())
}

// =============================================================================
// Shop Name Bootstrap
// =============================================================================

/// The shop's stored display name, if any. `None` means the UI should
/// prompt and call [`set_shop_name`].
pub async fn shop_name(ctx: &AppContext) -> AppResult<Option<String>> {
    Ok(ctx.store.get_shop_name(&ctx.shop.shop_id).await?)
}

/// Persists the shop display name (merge write).
pub async fn set_shop_name(ctx: &AppContext, name: &str) -> AppResult<String> {
    let name = validation::validate_name(name)?;
    ctx.store.set_shop_name(&ctx.shop.shop_id, &name).await?;
    Ok(name)
}

// =============================================================================
// Tree Browser
// =============================================================================

/// What the browser calls when a tree row's item is opened.
///
/// Injected at construction; the renderer never discovers handlers from
/// globals at runtime.
pub trait ItemOpenHandler: Send + Sync {
    fn on_item_open(&self, category_id: &str, item_id: &str, name: &str);
}

/// Holds the current tree snapshot and routes item-open gestures to the
/// injected handler.
pub struct TreeBrowser {
    store: Arc<dyn DocumentStore>,
    shop_id: String,
    handler: Arc<dyn ItemOpenHandler>,
    snapshot: std::sync::Mutex<CategoryTree>,
}

impl TreeBrowser {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        shop_id: impl Into<String>,
        handler: Arc<dyn ItemOpenHandler>,
    ) -> Self {
        TreeBrowser {
            store,
            shop_id: shop_id.into(),
            handler,
            snapshot: std::sync::Mutex::new(CategoryTree::default()),
        }
    }

    /// Rebuilds the snapshot from the store.
    pub async fn refresh(&self) -> AppResult<()> {
        let categories = self.store.list_categories(&self.shop_id).await?;
        let items = self.store.list_all_items(&self.shop_id).await?;
        let tree = CategoryTree::build(&categories, &items);
        *self.snapshot.lock().expect("Tree mutex poisoned") = tree;
        Ok(())
    }

    /// The current snapshot (cloned for rendering).
    pub fn snapshot(&self) -> CategoryTree {
        self.snapshot.lock().expect("Tree mutex poisoned").clone()
    }

    /// Routes an item-open gesture through the injected handler.
    pub fn open_item(&self, category_id: &str, item_id: &str) -> AppResult<()> {
        let snapshot = self.snapshot.lock().expect("Tree mutex poisoned");
        let node = snapshot
            .find(category_id)
            .ok_or_else(|| AppError::not_found("Category", category_id))?;
        let item = node
            .items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::not_found("Item", item_id))?;

        self.handler.on_item_open(category_id, item_id, &item.name);
        Ok(())
    }

    /// Keeps the snapshot fresh off the store's change feed. Spawn with
    /// `tokio::spawn(browser.clone().run(events))`; returns when the feed
    /// closes.
    pub async fn run(self: Arc<Self>, mut events: StoreEvents) {
        use tokio::sync::broadcast::error::RecvError;

        loop {
            match events.recv().await {
                Ok(event) => {
                    debug!(shop_id = %event.shop_id, kind = ?event.kind, "store changed; refreshing tree");
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "tree refresh failed");
                    }
                }
                // Lagged just means we missed intermediate states; one
                // refresh resynchronizes
                Err(RecvError::Lagged(_)) => {
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "tree refresh failed");
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{build_ctx, memory_store, StubCamera, StubRecognizer};
    use keeper_store::{CategoryStore, ItemStore};

    async fn catalog_ctx() -> (crate::AppContext, Arc<keeper_store::MemoryStore>) {
        let store = memory_store();
        let (ctx, _queue) = build_ctx(
            store.clone(),
            StubCamera::cancelling(),
            StubRecognizer::no_match(),
        );
        (ctx, store)
    }

    #[tokio::test]
    async fn test_create_category_and_subcategory_paths() {
        let (ctx, _store) = catalog_ctx().await;

        let drinks = create_category(&ctx, "Drinks", None).await.unwrap();
        assert_eq!(drinks.full_path, "Drinks");

        let sodas = create_category(&ctx, "Sodas", Some(&drinks.id)).await.unwrap();
        assert_eq!(sodas.full_path, "Drinks > Sodas");
        assert_eq!(sodas.ancestors.len(), 1);
        assert_eq!(sodas.ancestors[0].id, drinks.id);
    }

    #[tokio::test]
    async fn test_duplicate_names_are_refused_with_existing_id() {
        let (ctx, _store) = catalog_ctx().await;

        let drinks = create_category(&ctx, "Drinks", None).await.unwrap();
        let err = create_category(&ctx, "  DRINKS ", None).await.unwrap_err();
        assert!(err.message.contains("already exists"));

        // Items fold the same way, scoped to their category
        create_item(&ctx, &drinks.id, "Cola").await.unwrap();
        let err = create_item(&ctx, &drinks.id, "cola ").await.unwrap_err();
        assert!(err.message.contains("already exists"));
    }

    /// Leaf enforcement holds in both directions.
    #[tokio::test]
    async fn test_leaf_enforcement_both_directions() {
        let (ctx, _store) = catalog_ctx().await;

        let drinks = create_category(&ctx, "Drinks", None).await.unwrap();
        let _sodas = create_category(&ctx, "Sodas", Some(&drinks.id)).await.unwrap();

        // Category with a subcategory rejects item-add
        let err = create_item(&ctx, &drinks.id, "Cola").await.unwrap_err();
        assert!(err.message.contains("leaf"));

        // Category with an item rejects subcategory-add
        let bakery = create_category(&ctx, "Bakery", None).await.unwrap();
        create_item(&ctx, &bakery.id, "Bread").await.unwrap();
        let err = create_category(&ctx, "Cakes", Some(&bakery.id)).await.unwrap_err();
        assert!(err.message.contains("holds items"));

        // The modal offers mirror the same rules
        let opts = modal_options_for(&ctx, &drinks.id).await.unwrap();
        assert!(!opts.can_add_item);
        assert!(opts.can_add_subcategory);
        let opts = modal_options_for(&ctx, &bakery.id).await.unwrap();
        assert!(opts.can_add_item);
        assert!(!opts.can_add_subcategory);
    }

    /// Renaming cascades full_path to every descendant
    /// category and item; persisted, not just in memory.
    #[tokio::test]
    async fn test_rename_category_cascades_to_store() {
        let (ctx, store) = catalog_ctx().await;

        let drinks = create_category(&ctx, "Drinks", None).await.unwrap();
        let sodas = create_category(&ctx, "Sodas", Some(&drinks.id)).await.unwrap();
        let cola = create_item(&ctx, &sodas.id, "Cola 330ml").await.unwrap();

        rename_category(&ctx, &drinks.id, "Beverages").await.unwrap();

        let stored_sodas = store
            .get_category("shop-1", &sodas.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored_sodas.full_path, "Beverages > Sodas");

        let stored_cola = store
            .get_item("shop-1", &sodas.id, &cola.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored_cola.full_path, "Beverages > Sodas > Cola 330ml");
        assert!(stored_cola.full_path.starts_with("Beverages"));
    }

    #[tokio::test]
    async fn test_rename_item_keeps_ancestors() {
        let (ctx, store) = catalog_ctx().await;

        let bakery = create_category(&ctx, "Bakery", None).await.unwrap();
        let bread = create_item(&ctx, &bakery.id, "Bread").await.unwrap();

        let renamed = rename_item(&ctx, &bakery.id, &bread.id, "Sourdough").await.unwrap();
        assert_eq!(renamed.full_path, "Bakery > Sourdough");

        let stored = store
            .get_item("shop-1", &bakery.id, &bread.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Sourdough");
    }

    #[tokio::test]
    async fn test_shop_name_bootstrap() {
        let (ctx, _store) = catalog_ctx().await;

        assert!(shop_name(&ctx).await.unwrap().is_none());
        set_shop_name(&ctx, " Mama Njeri Groceries ").await.unwrap();
        assert_eq!(
            shop_name(&ctx).await.unwrap().as_deref(),
            Some("Mama Njeri Groceries")
        );

        assert!(set_shop_name(&ctx, "   ").await.is_err());
    }

    #[tokio::test]
    async fn test_tree_browser_refreshes_and_routes_opens() {
        let (ctx, store) = catalog_ctx().await;

        let bakery = create_category(&ctx, "Bakery", None).await.unwrap();
        let bread = create_item(&ctx, &bakery.id, "Bread").await.unwrap();

        #[derive(Default)]
        struct Recorder(std::sync::Mutex<Vec<(String, String, String)>>);
        impl ItemOpenHandler for Recorder {
            fn on_item_open(&self, category_id: &str, item_id: &str, name: &str) {
                self.0.lock().unwrap().push((
                    category_id.to_string(),
                    item_id.to_string(),
                    name.to_string(),
                ));
            }
        }

        let handler = Arc::new(Recorder::default());
        let browser = TreeBrowser::new(store.clone(), "shop-1", handler.clone());
        browser.refresh().await.unwrap();

        let snapshot = browser.snapshot();
        assert_eq!(snapshot.roots.len(), 1);
        assert_eq!(snapshot.roots[0].items.len(), 1);

        browser.open_item(&bakery.id, &bread.id).unwrap();
        let opened = handler.0.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].2, "Bread");
    }

    #[tokio::test]
    async fn test_tree_browser_follows_change_feed() {
        let (ctx, store) = catalog_ctx().await;

        let handler = Arc::new(NoopHandler);
        let browser = Arc::new(TreeBrowser::new(store.clone(), "shop-1", handler));
        let events = store.watch();
        let task = tokio::spawn(browser.clone().run(events));

        create_category(&ctx, "Bakery", None).await.unwrap();

        // Give the feed task a beat to process the event
        for _ in 0..50 {
            tokio::task::yield_now().await;
            if !browser.snapshot().roots.is_empty() {
                break;
            }
        }
        assert_eq!(browser.snapshot().roots.len(), 1);

        drop(store);
        drop(ctx);
        task.abort();
    }

    struct NoopHandler;
    impl ItemOpenHandler for NoopHandler {
        fn on_item_open(&self, _: &str, _: &str, _: &str) {}
    }
}
