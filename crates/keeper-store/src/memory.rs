//! # In-Memory Store
//!
//! Reference implementation of the repository traits, backing every flow
//! test and local development. Holds the same shop → categories → items
//! shape the managed store does, behind one `RwLock` so the atomic-append
//! contract holds trivially.
//!
//! ## Atomicity
//! `append_transaction` mutates the log and the cached stock under a
//! single write-lock acquisition; the reference semantics for what a
//! production adapter must express as one store write (array-union +
//! increment in the same operation).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use keeper_core::{Category, Item, StockTransaction};

use crate::error::{StoreError, StoreResult};
use crate::event::{ChangeKind, StoreEvent, StoreEvents};
use crate::patch::{CategoryPatch, ItemPatch};
use crate::repository::{CategoryStore, ItemStore, ShopStore};
use crate::DocumentStore;

/// Change-feed buffer. Subscribers that lag past this many events resync
/// by rebuilding from a full list call.
const EVENT_BUFFER: usize = 64;

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Default)]
struct ShopRecords {
    shop_name: Option<String>,
    categories: HashMap<String, Category>,
    items: HashMap<String, Item>,
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory document store.
#[derive(Debug)]
pub struct MemoryStore {
    shops: tokio::sync::RwLock<HashMap<String, ShopRecords>>,
    events: broadcast::Sender<StoreEvent>,

    /// Item ids whose next append fails with `WriteFailed`. A reference
    /// affordance for exercising partial-failure paths (e.g. a checkout
    /// where one line's write dies); unused in production wiring.
    failing_appends: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        MemoryStore {
            shops: tokio::sync::RwLock::new(HashMap::new()),
            events,
            failing_appends: Mutex::new(HashSet::new()),
        }
    }

    /// Arms a one-shot write failure for the given item's next append.
    pub fn fail_next_append(&self, item_id: &str) {
        self.failing_appends
            .lock()
            .expect("failing_appends lock poisoned")
            .insert(item_id.to_string());
    }

    fn emit(&self, shop_id: &str, kind: ChangeKind) {
        // A feed with no subscribers drops the event
        let _ = self.events.send(StoreEvent {
            shop_id: shop_id.to_string(),
            kind,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl DocumentStore for MemoryStore {
    fn watch(&self) -> StoreEvents {
        self.events.subscribe()
    }
}

// =============================================================================
// CategoryStore
// =============================================================================

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn get_category(
        &self,
        shop_id: &str,
        category_id: &str,
    ) -> StoreResult<Option<Category>> {
        let shops = self.shops.read().await;
        Ok(shops
            .get(shop_id)
            .and_then(|s| s.categories.get(category_id))
            .cloned())
    }

    async fn list_categories(&self, shop_id: &str) -> StoreResult<Vec<Category>> {
        let shops = self.shops.read().await;
        Ok(shops
            .get(shop_id)
            .map(|s| s.categories.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_children(
        &self,
        shop_id: &str,
        parent_id: Option<&str>,
    ) -> StoreResult<Vec<Category>> {
        let shops = self.shops.read().await;
        Ok(shops
            .get(shop_id)
            .map(|s| {
                s.categories
                    .values()
                    .filter(|c| c.parent_id.as_deref() == parent_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_category(&self, shop_id: &str, category: Category) -> StoreResult<()> {
        let mut shops = self.shops.write().await;
        let shop = shops.entry(shop_id.to_string()).or_default();
        debug!(shop_id, category_id = %category.id, name = %category.name, "create category");
        shop.categories.insert(category.id.clone(), category);
        drop(shops);
        self.emit(shop_id, ChangeKind::Category);
        Ok(())
    }

    async fn update_category(
        &self,
        shop_id: &str,
        category_id: &str,
        patch: CategoryPatch,
    ) -> StoreResult<Category> {
        let mut shops = self.shops.write().await;
        let category = shops
            .get_mut(shop_id)
            .and_then(|s| s.categories.get_mut(category_id))
            .ok_or_else(|| StoreError::not_found("Category", category_id))?;

        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(ancestors) = patch.ancestors {
            category.ancestors = ancestors;
        }
        if let Some(full_path) = patch.full_path {
            category.full_path = full_path;
        }
        if let Some(updated_at) = patch.updated_at {
            category.updated_at = Some(updated_at);
        }

        let updated = category.clone();
        drop(shops);
        self.emit(shop_id, ChangeKind::Category);
        Ok(updated)
    }

    async fn delete_category(&self, shop_id: &str, category_id: &str) -> StoreResult<()> {
        let mut shops = self.shops.write().await;
        let removed = shops
            .get_mut(shop_id)
            .and_then(|s| s.categories.remove(category_id));
        if removed.is_none() {
            return Err(StoreError::not_found("Category", category_id));
        }
        drop(shops);
        self.emit(shop_id, ChangeKind::Category);
        Ok(())
    }
}

// =============================================================================
// ItemStore
// =============================================================================

#[async_trait]
impl ItemStore for MemoryStore {
    async fn get_item(
        &self,
        shop_id: &str,
        category_id: &str,
        item_id: &str,
    ) -> StoreResult<Option<Item>> {
        let shops = self.shops.read().await;
        Ok(shops
            .get(shop_id)
            .and_then(|s| s.items.get(item_id))
            .filter(|i| i.category_id == category_id)
            .cloned())
    }

    async fn list_items(&self, shop_id: &str, category_id: &str) -> StoreResult<Vec<Item>> {
        let shops = self.shops.read().await;
        Ok(shops
            .get(shop_id)
            .map(|s| {
                s.items
                    .values()
                    .filter(|i| i.category_id == category_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_all_items(&self, shop_id: &str) -> StoreResult<Vec<Item>> {
        let shops = self.shops.read().await;
        Ok(shops
            .get(shop_id)
            .map(|s| s.items.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_item(&self, shop_id: &str, item: Item) -> StoreResult<()> {
        let mut shops = self.shops.write().await;
        let shop = shops.entry(shop_id.to_string()).or_default();

        if !shop.categories.contains_key(&item.category_id) {
            return Err(StoreError::not_found("Category", &item.category_id));
        }
        // Store-side leaf re-check, mirroring the UI affordance
        let has_subcategories = shop
            .categories
            .values()
            .any(|c| c.parent_id.as_deref() == Some(item.category_id.as_str()));
        if has_subcategories {
            return Err(StoreError::NotALeaf {
                category_id: item.category_id.clone(),
            });
        }

        debug!(shop_id, item_id = %item.id, name = %item.name, "create item");
        shop.items.insert(item.id.clone(), item);
        drop(shops);
        self.emit(shop_id, ChangeKind::Item);
        Ok(())
    }

    async fn update_item(
        &self,
        shop_id: &str,
        category_id: &str,
        item_id: &str,
        patch: ItemPatch,
    ) -> StoreResult<Item> {
        let mut shops = self.shops.write().await;
        let item = shops
            .get_mut(shop_id)
            .and_then(|s| s.items.get_mut(item_id))
            .filter(|i| i.category_id == category_id)
            .ok_or_else(|| StoreError::not_found("Item", item_id))?;

        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(ancestors) = patch.ancestors {
            item.ancestors = ancestors;
        }
        if let Some(full_path) = patch.full_path {
            item.full_path = full_path;
        }
        if let Some(images) = patch.images {
            item.images = images;
        }
        if let Some(buy_price) = patch.buy_price {
            item.buy_price = Some(buy_price);
        }
        if let Some(sell_price) = patch.sell_price {
            item.sell_price = Some(sell_price);
        }
        if let Some(updated_at) = patch.updated_at {
            item.updated_at = Some(updated_at);
        }

        let updated = item.clone();
        drop(shops);
        self.emit(shop_id, ChangeKind::Item);
        Ok(updated)
    }

    async fn append_transaction(
        &self,
        shop_id: &str,
        category_id: &str,
        item_id: &str,
        txn: StockTransaction,
    ) -> StoreResult<Item> {
        {
            let mut failing = self
                .failing_appends
                .lock()
                .expect("failing_appends lock poisoned");
            if failing.remove(item_id) {
                return Err(StoreError::WriteFailed(format!(
                    "injected append failure for {item_id}"
                )));
            }
        }

        let mut shops = self.shops.write().await;
        let item = shops
            .get_mut(shop_id)
            .and_then(|s| s.items.get_mut(item_id))
            .filter(|i| i.category_id == category_id)
            .ok_or_else(|| StoreError::not_found("Item", item_id))?;

        // Log entry and stock increment land under one lock acquisition:
        // the reference semantics for the single-write contract
        item.stock += txn.quantity;
        item.last_transaction_id = Some(txn.id.clone());
        item.last_stock_update = Some(txn.timestamp);
        item.updated_at = Some(txn.timestamp);
        item.stock_transactions.push(txn);

        let updated = item.clone();
        drop(shops);
        self.emit(shop_id, ChangeKind::Item);
        Ok(updated)
    }

    async fn delete_item(
        &self,
        shop_id: &str,
        category_id: &str,
        item_id: &str,
    ) -> StoreResult<()> {
        let mut shops = self.shops.write().await;
        let shop = shops
            .get_mut(shop_id)
            .ok_or_else(|| StoreError::not_found("Shop", shop_id))?;
        let belongs = shop
            .items
            .get(item_id)
            .map(|i| i.category_id == category_id)
            .unwrap_or(false);
        if !belongs {
            return Err(StoreError::not_found("Item", item_id));
        }
        shop.items.remove(item_id);
        drop(shops);
        self.emit(shop_id, ChangeKind::Item);
        Ok(())
    }
}

// =============================================================================
// ShopStore
// =============================================================================

#[async_trait]
impl ShopStore for MemoryStore {
    async fn get_shop_name(&self, shop_id: &str) -> StoreResult<Option<String>> {
        let shops = self.shops.read().await;
        Ok(shops.get(shop_id).and_then(|s| s.shop_name.clone()))
    }

    async fn set_shop_name(&self, shop_id: &str, name: &str) -> StoreResult<()> {
        let mut shops = self.shops.write().await;
        shops.entry(shop_id.to_string()).or_default().shop_name = Some(name.to_string());
        drop(shops);
        self.emit(shop_id, ChangeKind::Shop);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
