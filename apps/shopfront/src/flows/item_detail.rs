//! # Item Detail Flow
//!
//! Opening an item on top of the category browser, the view/edit toggle,
//! the price-ensure step, stock additions, and the best-effort embedder
//! push.
//!
//! ## Open Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        open_item routing                                │
//! │                                                                         │
//! │  images: 0 ──► prompt CaptureFirst   (solicit photo 1 immediately)     │
//! │  images: 1 ──► prompt CaptureSecond  (resume; photo 1 never re-runs)   │
//! │  images: 2 ──► needs prices? EnsurePrices : View                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use keeper_backend::ItemEmbedPayload;
use keeper_core::{
    ledger, tree, validation, CaptureSequencer, Item, Money, StockTransaction, DEFAULT_ACTOR,
};
use keeper_store::{CategoryStore, ItemPatch, ItemStore};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::state::{EditBuffer, ItemContext};
use crate::AppContext;

// =============================================================================
// Open / Close
// =============================================================================

/// What the detail view should solicit right after opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPrompt {
    CaptureFirst,
    CaptureSecond,
    EnsurePrices,
    View,
}

/// Outcome of opening an item.
#[derive(Debug, Clone)]
pub struct OpenedItem {
    pub item: Item,
    pub prompt: DetailPrompt,
}

/// Shows the category browser overlay.
pub fn open_categories(ctx: &AppContext) {
    ctx.session.with_mut(|s| s.overlay.open_categories());
}

/// Opens item detail for one tree row, replacing any previous item cache
/// wholesale.
///
/// A record that does not exist yet (item added to the tree but never
/// photographed) opens as an unpersisted default; capture 1's persist is
/// what creates it.
pub async fn open_item(
    ctx: &AppContext,
    category_id: &str,
    item_id: &str,
    name: &str,
) -> AppResult<OpenedItem> {
    let stored = ctx
        .store
        .get_item(&ctx.shop.shop_id, category_id, item_id)
        .await?;

    let item = match stored {
        Some(item) => item,
        None => {
            let category = ctx
                .store
                .get_category(&ctx.shop.shop_id, category_id)
                .await?
                .ok_or_else(|| AppError::not_found("Category", category_id))?;
            let ancestors = tree::child_ancestors(&category);
            let full_path = tree::join_path(&ancestors, name);
            Item {
                id: item_id.to_string(),
                name: name.to_string(),
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
            }
        }
    };

    let prompt = match item.images.len() {
        0 => DetailPrompt::CaptureFirst,
        1 => DetailPrompt::CaptureSecond,
        _ if item.needs_prices() => DetailPrompt::EnsurePrices,
        _ => DetailPrompt::View,
    };

    ctx.session.with_mut(|s| {
        s.overlay.open_item()?;
        s.clear_item();
        s.capture = CaptureSequencer::resume(item.images.len());
        s.previews = [item.images.first().cloned(), item.images.get(1).cloned()];
        s.current = Some(ItemContext {
            category_id: category_id.to_string(),
            item_id: item_id.to_string(),
            item: item.clone(),
        });
        Ok::<_, AppError>(())
    })?;

    debug!(item_id, images = item.images.len(), ?prompt, "item detail opened");
    Ok(OpenedItem { item, prompt })
}

/// Closes item detail, restoring the category browser.
///
/// Refused (user notified, state unchanged) while a capture is in flight.
pub fn close_item(ctx: &AppContext) -> AppResult<()> {
    ctx.session.with_mut(|s| {
        let capture = s.capture;
        s.overlay.close_item(&capture)?;
        s.clear_item();
        Ok(())
    })
}

/// Explicit backdrop close: both surfaces go away.
pub fn close_all(ctx: &AppContext) -> AppResult<()> {
    ctx.session.with_mut(|s| {
        let capture = s.capture;
        s.overlay.close_all(&capture)?;
        s.clear_item();
        Ok(())
    })
}

// =============================================================================
// Edit / Save
// =============================================================================

/// `view → edit`: seeds the edit buffer from the cache. Nothing persists.
pub fn begin_edit(ctx: &AppContext) -> AppResult<EditBuffer> {
    ctx.session.with_mut(|s| {
        let current = s.current.as_ref().ok_or_else(no_item_open)?;
        s.overlay.enter_edit()?;
        let buffer = EditBuffer::from_item(&current.item);
        s.edit = Some(buffer.clone());
        Ok(buffer)
    })
}

/// Updates the in-memory edit buffer as the user types.
pub fn set_edit_fields(ctx: &AppContext, name: &str, buy_price: &str, sell_price: &str) {
    ctx.session.with_mut(|s| {
        s.edit = Some(EditBuffer {
            name: name.to_string(),
            buy_price: buy_price.to_string(),
            sell_price: sell_price.to_string(),
        });
    });
}

/// `edit → view`. Leaving edit mode ALWAYS saves: the buffered name and
/// prices go out in a single merge write, then the cache refreshes and
/// the overlay returns to view mode. Missing numeric fields coerce to 0.
pub async fn save_edits(ctx: &AppContext) -> AppResult<Item> {
    let (buffer, category_id, item_id) = ctx.session.with_mut(|s| {
        if s.save_in_flight {
            return Err(AppError::in_flight("Save"));
        }
        if s.overlay.mode() != Some(keeper_core::DetailMode::Edit) {
            return Err(AppError::new(ErrorCode::BusinessLogic, "Not in edit mode"));
        }
        let current = s.current.as_ref().ok_or_else(no_item_open)?;
        let buffer = s.edit.clone().unwrap_or_else(|| EditBuffer::from_item(&current.item));
        s.save_in_flight = true;
        Ok((buffer, current.category_id.clone(), current.item_id.clone()))
    })?;

    let result = persist_edits(ctx, buffer, &category_id, &item_id).await;

    ctx.session.with_mut(|s| s.save_in_flight = false);
    result
}

async fn persist_edits(
    ctx: &AppContext,
    buffer: EditBuffer,
    category_id: &str,
    item_id: &str,
) -> AppResult<Item> {
    let name = validation::validate_name(&buffer.name)?;
    let buy_price = parse_price_or_zero(&buffer.buy_price)?;
    let sell_price = parse_price_or_zero(&buffer.sell_price)?;

    let now_ms = Utc::now().timestamp_millis();
    let item = ctx
        .store
        .update_item(
            &ctx.shop.shop_id,
            category_id,
            item_id,
            ItemPatch {
                name: Some(name),
                buy_price: Some(buy_price),
                sell_price: Some(sell_price),
                updated_at: Some(now_ms),
                ..Default::default()
            },
        )
        .await?;

    ctx.session.with_mut(|s| {
        if let Some(current) = s.current.as_mut() {
            current.item = item.clone();
        }
        s.edit = None;
        s.overlay.exit_edit()
    })?;

    info!(item_id, "item edits saved");
    Ok(item)
}

/// Empty field → zero; anything else must parse as a price.
fn parse_price_or_zero(text: &str) -> AppResult<Money> {
    if text.trim().is_empty() {
        Ok(Money::zero())
    } else {
        Ok(Money::parse(text)?)
    }
}

// =============================================================================
// Price Ensure
// =============================================================================

/// Persists both prices together once the second photo lands and either
/// price is unset. A no-op when both are already set.
pub async fn ensure_prices(ctx: &AppContext, buy_text: &str, sell_text: &str) -> AppResult<Item> {
    let (category_id, item_id, needs) = ctx.session.with(|s| {
        let current = s.current.as_ref().ok_or_else(no_item_open)?;
        Ok::<_, AppError>((
            current.category_id.clone(),
            current.item_id.clone(),
            current.item.needs_prices(),
        ))
    })?;

    if !needs {
        return ctx
            .session
            .with(|s| s.current.as_ref().map(|c| c.item.clone()))
            .ok_or_else(no_item_open);
    }

    let buy_price = parse_price_or_zero(buy_text)?;
    let sell_price = parse_price_or_zero(sell_text)?;
    let now_ms = Utc::now().timestamp_millis();

    let item = ctx
        .store
        .update_item(
            &ctx.shop.shop_id,
            &category_id,
            &item_id,
            ItemPatch {
                buy_price: Some(buy_price),
                sell_price: Some(sell_price),
                updated_at: Some(now_ms),
                ..Default::default()
            },
        )
        .await?;

    ctx.session.with_mut(|s| {
        if let Some(current) = s.current.as_mut() {
            current.item = item.clone();
        }
    });

    debug!(item_id, "prices ensured");
    Ok(item)
}

// =============================================================================
// Stock Addition
// =============================================================================

/// Result of a stock addition.
#[derive(Debug, Clone)]
pub struct StockAdded {
    pub new_stock: i64,
    pub transaction: StockTransaction,
}

/// Appends a restock to the ledger: validate → build → one atomic store
/// write → cache apply → integrity audit.
///
/// A failed write performs no local mutation; the cache stays at
/// last-known-good and the error surfaces for reattempt.
pub async fn add_stock(ctx: &AppContext, quantity_text: &str) -> AppResult<StockAdded> {
    let quantity = validation::parse_quantity(quantity_text)?;

    let (category_id, item_id) = ctx.session.with(|s| {
        let current = s.current.as_ref().ok_or_else(no_item_open)?;
        Ok::<_, AppError>((current.category_id.clone(), current.item_id.clone()))
    })?;

    let added_by = ctx
        .identity
        .display_name()
        .await
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

    let txn = ledger::prepare_stock_in(quantity, &added_by, Utc::now())?;

    // The store write must confirm before any local mutation
    ctx.store
        .append_transaction(&ctx.shop.shop_id, &category_id, &item_id, txn.clone())
        .await?;

    let new_stock = ctx.session.with_mut(|s| {
        let current = s.current.as_mut().ok_or_else(no_item_open)?;
        ledger::apply(&mut current.item, txn.clone());
        if let Err(fault) = ledger::audit(&current.item) {
            // Observable, never blocking
            warn!(%fault, "stock integrity warning");
        }
        Ok::<_, AppError>(current.item.stock)
    })?;

    info!(item_id = %item_id, quantity, new_stock, txn_id = %txn.id, "stock added");
    Ok(StockAdded {
        new_stock,
        transaction: txn,
    })
}

// =============================================================================
// Embedder Push
// =============================================================================

/// Pushes the completed item to the embedder hook.
///
/// Validation failures surface (both photos and both prices required);
/// push failures are logged only; best-effort by contract.
pub async fn sync_to_embedder(ctx: &AppContext) -> AppResult<()> {
    let item = ctx
        .session
        .with(|s| s.current.as_ref().map(|c| c.item.clone()))
        .ok_or_else(no_item_open)?;

    validation::validate_embedder_ready(&item)?;

    let payload = ItemEmbedPayload::from_item(&ctx.shop, &item, Utc::now().to_rfc3339());
    if let Err(e) = ctx.embedder.push(&payload).await {
        warn!(error = %e, item = %item.name, "embedder push failed");
    }
    Ok(())
}

fn no_item_open() -> AppError {
    AppError::new(ErrorCode::BusinessLogic, "No item is open")
}

// =============================================================================
// Unit Tests
// =============================================================================
