//! Test fixtures: stub ports and seeded contexts shared by the flow
//! tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use keeper_backend::{
    notifier, BackendError, BackendResult, CapturedImage, IdentityProvider, ImageHost,
    ItemEmbedPayload, ItemEmbedder, NotifierQueue, Recognizer, StaticIdentity,
};
use keeper_core::{Category, Item, Money, ScanMatch, ShopIdentity};
use keeper_store::{CategoryStore, ItemStore, MemoryStore};

use crate::flows::capture::CameraPort;
use crate::state::{SalesState, SessionState};
use crate::AppContext;

pub const SHOP: &str = "shop-1";

// =============================================================================
// Stub Ports
// =============================================================================

/// Camera that always supplies the same file, or always cancels.
pub struct StubCamera {
    image: Option<CapturedImage>,
}

impl StubCamera {
    pub fn supplying(file_name: &str) -> Arc<Self> {
        Arc::new(StubCamera {
            image: Some(CapturedImage::jpeg(file_name, vec![0xFF, 0xD8, 0xFF, 0xE0])),
        })
    }

    pub fn cancelling() -> Arc<Self> {
        Arc::new(StubCamera { image: None })
    }
}

#[async_trait]
impl CameraPort for StubCamera {
    async fn capture(&self) -> Option<CapturedImage> {
        self.image.clone()
    }
}

/// Image host that mints a unique URL per upload.
pub struct StubImageHost {
    counter: AtomicUsize,
}

#[async_trait]
impl ImageHost for StubImageHost {
    async fn upload(&self, image: &CapturedImage) -> BackendResult<String> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://img.test/{}-{n}.jpg", image.file_name))
    }
}

/// Image host that always fails.
pub struct FlakyImageHost;

#[async_trait]
impl ImageHost for FlakyImageHost {
    async fn upload(&self, _image: &CapturedImage) -> BackendResult<String> {
        Err(BackendError::UnexpectedStatus {
            endpoint: "https://img.test/upload".to_string(),
            status: 503,
        })
    }
}

/// Recognizer that always answers the same way.
pub struct StubRecognizer {
    result: Option<ScanMatch>,
}

impl StubRecognizer {
    pub fn matching(m: ScanMatch) -> Arc<Self> {
        Arc::new(StubRecognizer { result: Some(m) })
    }

    pub fn no_match() -> Arc<Self> {
        Arc::new(StubRecognizer { result: None })
    }
}

#[async_trait]
impl Recognizer for StubRecognizer {
    async fn scan(&self, _shop_id: &str, _frame: &str) -> BackendResult<Option<ScanMatch>> {
        Ok(self.result.clone())
    }
}

/// Embedder that always fails; the flows must treat pushes as
/// best-effort, so the default fixture exercises the logged-only path.
pub struct FailingEmbedder;

#[async_trait]
impl ItemEmbedder for FailingEmbedder {
    async fn push(&self, _payload: &ItemEmbedPayload) -> BackendResult<()> {
        Err(BackendError::UnexpectedStatus {
            endpoint: "https://backend.test/itemEmbeder".to_string(),
            status: 500,
        })
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn scan_match(item_id: &str, name: &str, price_cents: i64) -> ScanMatch {
    ScanMatch {
        item_id: item_id.to_string(),
        category_id: "cat-1".to_string(),
        name: name.to_string(),
        score: 0.9,
        thumbnail: None,
        sell_price: Money::from_cents(price_cents),
    }
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        parent_id: None,
        ancestors: vec![],
        full_path: name.to_string(),
        created_at: 0,
        updated_at: None,
    }
}

fn item(id: &str, name: &str, images: &[&str], sell_cents: Option<i64>, stock: i64) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        category_id: "cat-1".to_string(),
        ancestors: vec![keeper_core::PathSegment::new("cat-1", "Bakery")],
        full_path: format!("Bakery > {name}"),
        images: images.iter().map(|s| s.to_string()).collect(),
        buy_price: None,
        sell_price: sell_cents.map(Money::from_cents),
        stock,
        stock_transactions: vec![],
        last_transaction_id: None,
        last_stock_update: None,
        created_at: 0,
        updated_at: None,
    }
}

/// Builds an AppContext over the given store and ports. Returns the
/// notifier queue so tests can assert on fire-and-forget payloads.
pub fn build_ctx(
    store: Arc<MemoryStore>,
    camera: Arc<StubCamera>,
    recognizer: Arc<StubRecognizer>,
) -> (AppContext, NotifierQueue) {
    let (notifier_handle, queue) = notifier::channel();
    let shop = ShopIdentity {
        shop_id: SHOP.to_string(),
        shop_name: "Mama Njeri Groceries".to_string(),
    };
    let identity: Arc<dyn IdentityProvider> = Arc::new(StaticIdentity::new(
        shop.clone(),
        Some("Amina".to_string()),
    ));

    let ctx = AppContext {
        shop,
        store,
        session: SessionState::new(),
        sales: SalesState::new(),
        notifier: notifier_handle,
        embedder: Arc::new(FailingEmbedder),
        image_host: Arc::new(StubImageHost {
            counter: AtomicUsize::new(0),
        }),
        camera,
        recognizer,
        identity,
    };
    (ctx, queue)
}

/// Seeds category `cat-1` and, when `images` is non-empty, a persisted
/// `item-1` carrying those images.
pub async fn seed_catalog(store: &MemoryStore, images: &[&str]) {
    store
        .create_category(SHOP, category("cat-1", "Bakery"))
        .await
        .unwrap();
    if !images.is_empty() {
        store
            .create_item(SHOP, item("item-1", "Bread", images, None, 0))
            .await
            .unwrap();
    }
}

/// Seeds the sales fixtures: bread (2.50, stock 10) and milk (1.20,
/// stock 10) under `cat-1`.
pub async fn seed_sales_catalog(store: &MemoryStore) {
    store
        .create_category(SHOP, category("cat-1", "Bakery"))
        .await
        .unwrap();
    store
        .create_item(SHOP, item("bread", "Bread", &[], Some(250), 10))
        .await
        .unwrap();
    store
        .create_item(SHOP, item("milk", "Milk", &[], Some(120), 10))
        .await
        .unwrap();
}

/// Context seeded with `cat-1` (+ `item-1` when `images` is non-empty),
/// session closed.
pub async fn seeded_ctx(
    images: &[&str],
    camera: Arc<StubCamera>,
) -> (AppContext, NotifierQueue, Arc<MemoryStore>) {
    let store = memory_store();
    seed_catalog(&store, images).await;
    let (ctx, queue) = build_ctx(store.clone(), camera, StubRecognizer::no_match());
    (ctx, queue, store)
}

/// Context with `item-1` already open in item detail (capture sequencer
/// resumed from the image count).
pub async fn ctx_with_open_item(
    images: &[&str],
    camera: Arc<StubCamera>,
) -> (AppContext, NotifierQueue, Arc<MemoryStore>) {
    let (ctx, queue, store) = seeded_ctx(images, camera).await;
    crate::flows::item_detail::open_categories(&ctx);
    crate::flows::item_detail::open_item(&ctx, "cat-1", "item-1", "Bread")
        .await
        .unwrap();
    (ctx, queue, store)
}
