//! # Recognition Client
//!
//! The scan half of the sales flow: one captured video frame goes up,
//! the backend's best visual match (or nothing) comes back.
//!
//! ## Wire Contract
//! ```text
//! POST {base}/sales
//!   → { "shop_id": "...", "frame": "data:image/jpeg;base64,..." }
//!   ← { "match": null }
//!   ← { "match": { "item_id", "category_id", "name", "score",
//!                  "thumbnail", "sellPrice" } }
//! ```
//!
//! Match acceptance is the backend's call (it thresholds similarity
//! before answering); the client treats any non-null match as
//! presentable and never re-filters by score.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use keeper_core::ScanMatch;

use crate::error::{BackendError, BackendResult};

/// Encodes a captured JPEG frame the way the scan endpoint expects it.
pub fn encode_frame(jpeg_bytes: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(jpeg_bytes)
    )
}

#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    shop_id: &'a str,
    frame: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(rename = "match")]
    best_match: Option<ScanMatch>,
}

// =============================================================================
// Port Trait
// =============================================================================

/// Scan port: the sales flow depends on this, not on HTTP.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Sends one encoded frame; `Ok(None)` is a clean no-match.
    async fn scan(&self, shop_id: &str, frame: &str) -> BackendResult<Option<ScanMatch>>;
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Production recognizer over the recognition backend.
#[derive(Debug, Clone)]
pub struct RecognitionClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecognitionClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        RecognitionClient {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Recognizer for RecognitionClient {
    async fn scan(&self, shop_id: &str, frame: &str) -> BackendResult<Option<ScanMatch>> {
        let endpoint = format!("{}/sales", self.base_url);

        let response = self
            .http
            .post(&endpoint)
            .json(&ScanRequest { shop_id, frame })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body: ScanResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        match &body.best_match {
            Some(m) => debug!(item_id = %m.item_id, score = m.score, "scan matched"),
            None => debug!("scan found no match"),
        }

        Ok(body.best_match)
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

    #[test]
    fn test_encode_frame_has_data_url_prefix() {
        let encoded = encode_frame(&[0xFF, 0xD8, 0xFF]);
        assert!(encoded.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_scan_decodes_match() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sales"))
            .and(body_partial_json(serde_json::json!({ "shop_id": "shop-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "match": {
                    "item_id": "item-9",
                    "category_id": "cat-2",
                    "name": "Milk 500ml",
                    "score": 0.91,
                    "thumbnail": "https://img/milk.jpg",
                    "sellPrice": 120
                }
            })))
            .mount(&server)
            .await;

        let client = RecognitionClient::new(reqwest::Client::new(), server.uri());
        let result = client.scan("shop-1", "data:image/jpeg;base64,AAA").await.unwrap();

        let m = result.unwrap();
        assert_eq!(m.item_id, "item-9");
        assert_eq!(m.name, "Milk 500ml");
        assert_eq!(m.sell_price.cents(), 120);
    }

    #[tokio::test]
    async fn test_scan_no_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sales"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "match": null })),
            )
            .mount(&server)
            .await;

        let client = RecognitionClient::new(reqwest::Client::new(), server.uri());
        let result = client.scan("shop-1", "frame").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_scan_surfaces_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sales"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = RecognitionClient::new(reqwest::Client::new(), server.uri());
        let err = client.scan("shop-1", "frame").await.unwrap_err();
        assert!(matches!(err, BackendError::UnexpectedStatus { status: 500, .. }));
    }
}
