//! # Item Embedder Hook
//!
//! Best-effort push of a flattened, completed item to the backend's
//! `/itemEmbeder` endpoint. The response is logged and otherwise ignored;
//! a failure never blocks the save that triggered it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use tracing::debug;

use keeper_core::{Item, Money, ShopIdentity};

use crate::error::{BackendError, BackendResult};

// =============================================================================
// Payload
// =============================================================================

/// The flattened item payload, wire-named the way the endpoint reads it.
///
/// `text_vector`/`image_vectors` ship empty; the backend computes both;
/// the fields exist so the record shape is complete on arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEmbedPayload {
    pub shop_id: String,
    pub item_name: String,
    pub category_path: String,
    pub buying_price: Money,
    pub selling_price: Money,
    pub images: Vec<String>,
    pub text_vector: Vec<f64>,
    pub image_vectors: Map<String, serde_json::Value>,
    /// ISO-8601 timestamp.
    pub updated_at: String,
}

impl ItemEmbedPayload {
    /// Flattens a completed item. Callers validate completeness first
    /// (both photos, both prices) via
    /// [`validate_embedder_ready`](keeper_core::validation::validate_embedder_ready);
    /// missing prices here coerce to zero rather than panic.
    pub fn from_item(shop: &ShopIdentity, item: &Item, updated_at: String) -> Self {
        ItemEmbedPayload {
            shop_id: shop.shop_id.clone(),
            item_name: item.name.clone(),
            category_path: item.full_path.clone(),
            buying_price: item.buy_price.unwrap_or_default(),
            selling_price: item.sell_price.unwrap_or_default(),
            images: item.images.clone(),
            text_vector: Vec::new(),
            image_vectors: Map::new(),
            updated_at,
        }
    }
}

// =============================================================================
// Port Trait
// =============================================================================

/// Embedder port for the item-detail flow.
#[async_trait]
pub trait ItemEmbedder: Send + Sync {
    async fn push(&self, payload: &ItemEmbedPayload) -> BackendResult<()>;
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Production embedder client.
#[derive(Debug, Clone)]
pub struct ItemEmbedderClient {
    http: reqwest::Client,
    base_url: String,
}

impl ItemEmbedderClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        ItemEmbedderClient {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ItemEmbedder for ItemEmbedderClient {
    async fn push(&self, payload: &ItemEmbedPayload) -> BackendResult<()> {
        let endpoint = format!("{}/itemEmbeder", self.base_url);
        let response = self.http.post(&endpoint).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        debug!(item = %payload.item_name, "item pushed to embedder");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shop() -> ShopIdentity {
        ShopIdentity {
            shop_id: "shop-1".to_string(),
            shop_name: "Mama Njeri Groceries".to_string(),
        }
    }

    fn completed_item() -> Item {
        Item {
            id: "item-1".to_string(),
            name: "Bread".to_string(),
            category_id: "cat-1".to_string(),
            ancestors: vec![],
            full_path: "Bakery > Bread".to_string(),
            images: vec!["https://img/0.jpg".to_string(), "https://img/1.jpg".to_string()],
            buy_price: Some(Money::from_cents(180)),
            sell_price: Some(Money::from_cents(250)),
            stock: 0,
            stock_transactions: vec![],
            last_transaction_id: None,
            last_stock_update: None,
            created_at: 0,
            updated_at: None,
        }
    }

    #[test]
    fn test_payload_flattens_item() {
        let payload =
            ItemEmbedPayload::from_item(&shop(), &completed_item(), "2026-08-07T00:00:00Z".into());

        assert_eq!(payload.shop_id, "shop-1");
        assert_eq!(payload.category_path, "Bakery > Bread");
        assert_eq!(payload.images.len(), 2);
        assert!(payload.text_vector.is_empty());
        assert!(payload.image_vectors.is_empty());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("itemName").is_some());
        assert!(json.get("categoryPath").is_some());
        assert!(json.get("buyingPrice").is_some());
        assert!(json.get("sellingPrice").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[tokio::test]
    async fn test_push_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/itemEmbeder"))
            .and(body_partial_json(serde_json::json!({
                "shopId": "shop-1",
                "itemName": "Bread"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ItemEmbedderClient::new(reqwest::Client::new(), server.uri());
        let payload =
            ItemEmbedPayload::from_item(&shop(), &completed_item(), "2026-08-07T00:00:00Z".into());
        client.push(&payload).await.unwrap();
    }
}
