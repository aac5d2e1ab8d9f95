//! # Embedding Notifier
//!
//! Fire-and-forget notification that a photo landed in an image slot, so
//! the backend can compute and index the slot's embedding.
//!
//! ## Queued Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Notifier Flow                                        │
//! │                                                                         │
//! │  capture flow ──notify_image_saved()──► mpsc queue ──► NotifierWorker  │
//! │       │                                                     │           │
//! │       │  returns immediately; the persist                   ▼           │
//! │       │  path NEVER awaits the notification      POST /vectorize-item  │
//! │       │                                                     │           │
//! │       ▼                                            response/failure     │
//! │  next capture step                                 logged, nothing      │
//! │                                                    retried or blocked   │
//! │                                                                         │
//! │  INDEX CONTRACT: the payload's image_index is the slot that was        │
//! │  written - photo 1 → 0, photo 2 → 1, retake → the retaken slot.        │
//! │  Mis-tagging breaks the backend's slot correspondence.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tests assert on payloads by holding the queue's receiving end; the
//! worker never needs to run for the main flow to be exercised.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{BackendError, BackendResult};

/// Queue depth. Notifications are tiny and the worker drains fast; an
/// overflowing event is dropped with a warning rather than blocking.
const QUEUE_CAPACITY: usize = 64;

// =============================================================================
// Payload
// =============================================================================

/// The `/vectorize-item` notification body. Wire names are exactly what
/// the backend validates for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSavedEvent {
    /// Always `"image_saved"`.
    pub event: String,
    pub image_url: String,
    pub item_id: String,
    pub shop_id: String,
    pub category_id: String,
    /// The slot that was written (0 or 1). Strict contract.
    pub image_index: usize,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl ImageSavedEvent {
    pub fn new(
        image_url: impl Into<String>,
        item_id: impl Into<String>,
        shop_id: impl Into<String>,
        category_id: impl Into<String>,
        image_index: usize,
        timestamp: i64,
    ) -> Self {
        ImageSavedEvent {
            event: "image_saved".to_string(),
            image_url: image_url.into(),
            item_id: item_id.into(),
            shop_id: shop_id.into(),
            category_id: category_id.into(),
            image_index,
            timestamp,
        }
    }
}

// =============================================================================
// Handle and Queue
// =============================================================================

/// Sender half, held by the capture flow.
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    tx: mpsc::Sender<ImageSavedEvent>,
}

impl NotifierHandle {
    /// Enqueues a notification without awaiting delivery.
    ///
    /// A full or closed queue is logged and swallowed; the persist path
    /// must never fail because a best-effort notification couldn't go out.
    pub fn notify_image_saved(&self, event: ImageSavedEvent) {
        debug!(
            item_id = %event.item_id,
            image_index = event.image_index,
            "queueing embedding notification"
        );
        if let Err(e) = self.tx.try_send(event) {
            warn!(error = %e, "embedding notification dropped");
        }
    }
}

/// Receiver half, owned by the worker (or by a test).
#[derive(Debug)]
pub struct NotifierQueue {
    rx: mpsc::Receiver<ImageSavedEvent>,
}

impl NotifierQueue {
    /// Next queued notification, `None` when every handle is gone.
    pub async fn recv(&mut self) -> Option<ImageSavedEvent> {
        self.rx.recv().await
    }

    /// Non-blocking drain for assertions.
    pub fn try_recv(&mut self) -> Option<ImageSavedEvent> {
        self.rx.try_recv().ok()
    }
}

/// Creates the handle/queue pair.
pub fn channel() -> (NotifierHandle, NotifierQueue) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    (NotifierHandle { tx }, NotifierQueue { rx })
}

// =============================================================================
// Worker
// =============================================================================

/// Drains the queue and POSTs each notification. Spawn with
/// `tokio::spawn(worker.run())`.
pub struct NotifierWorker {
    queue: NotifierQueue,
    http: reqwest::Client,
    base_url: String,
}

impl NotifierWorker {
    pub fn new(queue: NotifierQueue, http: reqwest::Client, base_url: impl Into<String>) -> Self {
        NotifierWorker {
            queue,
            http,
            base_url: base_url.into(),
        }
    }

    /// Runs until every handle is dropped.
    pub async fn run(mut self) {
        info!("embedding notifier starting");

        while let Some(event) = self.queue.recv().await {
            match self.post(&event).await {
                Ok(()) => debug!(item_id = %event.item_id, image_index = event.image_index, "embedding notification delivered"),
                // Logged only: fire-and-forget means no retry, no surfacing
                Err(e) => warn!(error = %e, item_id = %event.item_id, "embedding notification failed"),
            }
        }

        info!("embedding notifier stopped");
    }

    async fn post(&self, event: &ImageSavedEvent) -> BackendResult<()> {
        let endpoint = format!("{}/vectorize-item", self.base_url);
        let response = self.http.post(&endpoint).json(event).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
