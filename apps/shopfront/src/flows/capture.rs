//! # Capture Flow
//!
//! Orchestrates one capture step end-to-end around the pure sequencer:
//! device capture → local preview → image-host upload → record persist →
//! embedding notification → phase advance.
//!
//! ## One Step
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    capture_first / capture_second                       │
//! │                                                                         │
//! │  begin (sequencer gate) ──► camera.capture() ── None? cancel, done     │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                         local preview (before network)                  │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                         image_host.upload() ── Err? revert phase,      │
//! │                                   │             surface error           │
//! │                                   ▼                                     │
//! │                         persist URL into images[slot]                   │
//! │                         (first photo of a brand-new item also writes    │
//! │                          stock: 0 and an empty ledger)                  │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                         notify_image_saved(url, slot)  ← fire & forget │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                         advance sequencer, refresh cache                │
//! │                                                                         │
//! │  A cancel or failure aborts ONLY this step; whatever was already        │
//! │  persisted stays. Retry means the user re-invokes the step.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use keeper_backend::{CapturedImage, ImageSavedEvent};
use keeper_core::Item;
use keeper_store::{ItemPatch, ItemStore};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::AppContext;

// =============================================================================
// Camera Port
// =============================================================================

/// Device capture port. Suspends until the user supplies a file or
/// dismisses the picker; cancellation is user-driven only, no timeout.
#[async_trait]
pub trait CameraPort: Send + Sync {
    /// `None` means the user cancelled.
    async fn capture(&self) -> Option<CapturedImage>;
}

// =============================================================================
// Step Outcome
// =============================================================================

/// Where the flow stands after a capture step returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStep {
    /// User cancelled the picker; prior persisted state untouched.
    Cancelled,
    /// Photo 1 saved; the capture-2 CTA should be showing.
    AwaitingSecond,
    /// Both photos saved and at least one price is unset: solicit prices.
    PriceEnsure,
    /// Nothing further to capture.
    Complete,
}

// =============================================================================
// Steps
// =============================================================================

/// Captures and persists photo 1.
///
/// For a brand-new item this is also the write that creates the record:
/// first image URL plus ledger-neutral stock initialization (`stock: 0`,
/// empty log).
pub async fn capture_first(ctx: &AppContext) -> AppResult<CaptureStep> {
    let (category_id, item_id) = ctx.session.with_mut(|s| {
        let current = s.current.as_ref().ok_or_else(no_item_open)?;
        // Resume contract: photo 1 never re-runs once a slot is filled
        if !current.item.images.is_empty() {
            return Err(AppError::new(
                ErrorCode::BusinessLogic,
                "Photo 1 is already captured",
            ));
        }
        s.capture.begin_first().map_err(AppError::from)?;
        Ok((current.category_id.clone(), current.item_id.clone()))
    })?;

    let Some(image) = ctx.camera.capture().await else {
        ctx.session.with_mut(|s| {
            let _ = s.capture.cancel_first();
            s.previews[0] = None;
        });
        info!("photo 1 capture cancelled");
        return Ok(CaptureStep::Cancelled);
    };

    // Immediate local preview, before any network round-trip
    ctx.session
        .with_mut(|s| s.previews[0] = Some(format!("local:{}", image.file_name)));

    let url = match ctx.image_host.upload(&image).await {
        Ok(url) => url,
        Err(e) => {
            ctx.session.with_mut(|s| {
                let _ = s.capture.cancel_first();
                s.previews[0] = None;
            });
            return Err(e.into());
        }
    };

    let now = Utc::now();
    let now_ms = now.timestamp_millis();

    let existing = ctx
        .store
        .get_item(&ctx.shop.shop_id, &category_id, &item_id)
        .await?;

    let persist_result = match existing {
        Some(_) => {
            ctx.store
                .update_item(
                    &ctx.shop.shop_id,
                    &category_id,
                    &item_id,
                    ItemPatch {
                        images: Some(vec![url.clone()]),
                        updated_at: Some(now_ms),
                        ..Default::default()
                    },
                )
                .await
        }
        None => {
            // Brand-new record: photo plus stock: 0 and an empty log
            let template = ctx
                .session
                .with(|s| s.current.as_ref().map(|c| c.item.clone()))
                .ok_or_else(no_item_open)?;
            let record = Item {
                images: vec![url.clone()],
                stock: 0,
                stock_transactions: vec![],
                created_at: now_ms,
                ..template
            };
            ctx.store
                .create_item(&ctx.shop.shop_id, record.clone())
                .await
                .map(|_| record)
        }
    };

    let item = match persist_result {
        Ok(item) => item,
        Err(e) => {
            ctx.session.with_mut(|s| {
                let _ = s.capture.cancel_first();
                s.previews[0] = None;
            });
            return Err(e.into());
        }
    };

    ctx.notifier.notify_image_saved(ImageSavedEvent::new(
        url.clone(),
        &item_id,
        &ctx.shop.shop_id,
        &category_id,
        0,
        now_ms,
    ));

    ctx.session.with_mut(|s| {
        let _ = s.capture.complete_first();
        s.previews[0] = Some(url.clone());
        if let Some(current) = s.current.as_mut() {
            current.item = item;
        }
    });

    debug!(item_id = %item_id, "photo 1 saved");
    Ok(CaptureStep::AwaitingSecond)
}

/// Captures and persists photo 2, then routes to price-ensure when a
/// price is still unset.
pub async fn capture_second(ctx: &AppContext) -> AppResult<CaptureStep> {
    let (category_id, item_id, first_url) = ctx.session.with_mut(|s| {
        let current = s.current.as_ref().ok_or_else(no_item_open)?;
        let first_url = current.item.images.first().cloned().ok_or_else(|| {
            AppError::new(ErrorCode::BusinessLogic, "Capture photo 1 first")
        })?;
        s.capture.begin_second().map_err(AppError::from)?;
        Ok::<_, AppError>((
            current.category_id.clone(),
            current.item_id.clone(),
            first_url,
        ))
    })?;

    let Some(image) = ctx.camera.capture().await else {
        ctx.session.with_mut(|s| {
            let _ = s.capture.cancel_second();
            s.previews[1] = None;
        });
        info!("photo 2 capture cancelled");
        return Ok(CaptureStep::Cancelled);
    };

    ctx.session
        .with_mut(|s| s.previews[1] = Some(format!("local:{}", image.file_name)));

    let url = match ctx.image_host.upload(&image).await {
        Ok(url) => url,
        Err(e) => {
            ctx.session.with_mut(|s| {
                let _ = s.capture.cancel_second();
                s.previews[1] = None;
            });
            return Err(e.into());
        }
    };

    let now_ms = Utc::now().timestamp_millis();
    let persist_result = ctx
        .store
        .update_item(
            &ctx.shop.shop_id,
            &category_id,
            &item_id,
            ItemPatch {
                images: Some(vec![first_url, url.clone()]),
                updated_at: Some(now_ms),
                ..Default::default()
            },
        )
        .await;

    let item = match persist_result {
        Ok(item) => item,
        Err(e) => {
            ctx.session.with_mut(|s| {
                let _ = s.capture.cancel_second();
                s.previews[1] = None;
            });
            return Err(e.into());
        }
    };

    ctx.notifier.notify_image_saved(ImageSavedEvent::new(
        url.clone(),
        &item_id,
        &ctx.shop.shop_id,
        &category_id,
        1,
        now_ms,
    ));

    let needs_prices = item.needs_prices();
    ctx.session.with_mut(|s| {
        let _ = s.capture.complete_second();
        s.previews[1] = Some(url.clone());
        if let Some(current) = s.current.as_mut() {
            current.item = item;
        }
    });

    debug!(item_id = %item_id, "photo 2 saved");
    Ok(if needs_prices {
        CaptureStep::PriceEnsure
    } else {
        CaptureStep::Complete
    })
}

/// Edit-mode retake of one specific slot.
///
/// Re-runs capture → upload → persist → notify for that index only; the
/// other slot and the stock ledger are untouched, and the notification
/// carries the retaken slot's index.
pub async fn retake(ctx: &AppContext, slot: usize) -> AppResult<CaptureStep> {
    let (category_id, item_id, mut images) = ctx.session.with_mut(|s| {
        let current = s.current.as_ref().ok_or_else(no_item_open)?;
        if slot >= current.item.images.len() {
            return Err(AppError::new(
                ErrorCode::BusinessLogic,
                format!("No photo in slot {slot} to retake"),
            ));
        }
        s.capture.begin_retake(slot).map_err(AppError::from)?;
        Ok((
            current.category_id.clone(),
            current.item_id.clone(),
            current.item.images.clone(),
        ))
    })?;

    let image_count = images.len();

    let Some(image) = ctx.camera.capture().await else {
        ctx.session
            .with_mut(|s| s.capture.finish_retake(image_count));
        info!(slot, "retake cancelled");
        return Ok(CaptureStep::Cancelled);
    };

    ctx.session
        .with_mut(|s| s.previews[slot] = Some(format!("local:{}", image.file_name)));

    let url = match ctx.image_host.upload(&image).await {
        Ok(url) => url,
        Err(e) => {
            ctx.session.with_mut(|s| {
                s.capture.finish_retake(image_count);
                s.previews[slot] = None;
            });
            return Err(e.into());
        }
    };

    images[slot] = url.clone();
    let now_ms = Utc::now().timestamp_millis();

    let persist_result = ctx
        .store
        .update_item(
            &ctx.shop.shop_id,
            &category_id,
            &item_id,
            ItemPatch {
                images: Some(images),
                updated_at: Some(now_ms),
                ..Default::default()
            },
        )
        .await;

    let item = match persist_result {
        Ok(item) => item,
        Err(e) => {
            ctx.session.with_mut(|s| {
                s.capture.finish_retake(image_count);
                s.previews[slot] = None;
            });
            return Err(e.into());
        }
    };

    // Index correctness is a strict contract with the backend
    ctx.notifier.notify_image_saved(ImageSavedEvent::new(
        url.clone(),
        &item_id,
        &ctx.shop.shop_id,
        &category_id,
        slot,
        now_ms,
    ));

    let new_count = item.images.len();
    ctx.session.with_mut(|s| {
        s.capture.finish_retake(new_count);
        s.previews[slot] = Some(url.clone());
        if let Some(current) = s.current.as_mut() {
            current.item = item;
        }
    });

    warn_if_slot_mismatch(slot, new_count);
    Ok(CaptureStep::Complete)
}

fn warn_if_slot_mismatch(slot: usize, image_count: usize) {
    if slot >= image_count {
        warn!(slot, image_count, "retake left fewer photos than the slot it wrote");
    }
}

fn no_item_open() -> AppError {
    AppError::new(ErrorCode::BusinessLogic, "No item is open")
}

// =============================================================================
// Unit Tests
// =============================================================================
