//! # Image Host Client
//!
//! Multipart upload of a captured photo to the managed image host,
//! returning the durable secure URL that goes into the item's image slot.
//!
//! ## Wire Contract
//! ```text
//! POST {upload_url}
//!   multipart/form-data:
//!     file          = <image bytes>
//!     upload_preset = <fixed preset id>
//!   ← { "secure_url": "https://..." }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BackendError, BackendResult};

// =============================================================================
// Captured Image
// =============================================================================

/// A photo as it comes off the device capture, before upload.
///
/// The local preview renders from these bytes while the upload runs.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        CapturedImage {
            file_name: file_name.into(),
            mime: "image/jpeg".to_string(),
            bytes,
        }
    }
}

// =============================================================================
// Port Trait
// =============================================================================

/// Upload port: the capture flow depends on this, not on HTTP.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads one photo and returns its durable URL.
    async fn upload(&self, image: &CapturedImage) -> BackendResult<String>;
}

// =============================================================================
// HTTP Client
// =============================================================================

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Production image-host client (upload endpoint + fixed preset).
#[derive(Debug, Clone)]
pub struct ImageHostClient {
    http: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl ImageHostClient {
    pub fn new(
        http: reqwest::Client,
        upload_url: impl Into<String>,
        upload_preset: impl Into<String>,
    ) -> Self {
        ImageHostClient {
            http,
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
        }
    }
}

#[async_trait]
impl ImageHost for ImageHostClient {
    async fn upload(&self, image: &CapturedImage) -> BackendResult<String> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self.http.post(&self.upload_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                endpoint: self.upload_url.clone(),
                status: status.as_u16(),
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        debug!(url = %body.secure_url, "image uploaded");
        Ok(body.secure_url)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
