//! # Sales Flow
//!
//! The linear selling loop: scan → match-or-no-match → accept/reject →
//! quantity → cart → checkout → payment method → commit → receipt → reset.
//!
//! ## Commit Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Commit                                   │
//! │                                                                         │
//! │  for line in cart (IN CART ORDER):                                     │
//! │      sale transaction (negative qty, line price, shared receipt id)    │
//! │      │                                                                  │
//! │      ├── Ok  → line leaves the cart immediately                        │
//! │      └── Err → recorded, loop CONTINUES                                │
//! │                                                                         │
//! │  NOT atomic across lines: earlier commits stand when a later line      │
//! │  fails. The failure list surfaces after the loop, and because          │
//! │  committed lines already left the cart, re-running checkout retries    │
//! │  ONLY the failed remainder (the duplicate-submission guard).           │
//! │                                                                         │
//! │  Full success → receipt from the SUBMITTED lines (never re-queried),   │
//! │  cart cleared, camera torn down.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use keeper_backend::encode_frame;
use keeper_core::{
    cart::new_receipt_id, ledger, validation, CartLine, CoreError, Money, PaymentMethod, Receipt,
    ScanMatch, DEFAULT_ACTOR,
};
use keeper_store::ItemStore;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::AppContext;

// =============================================================================
// Cart View
// =============================================================================

/// Cart summary for the camera overlay (badge + checkout header).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub line_count: usize,
    pub badge_count: i64,
    pub total: Money,
}

impl CartView {
    fn of(cart: &keeper_core::Cart) -> Self {
        CartView {
            line_count: cart.line_count(),
            badge_count: cart.badge_count(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Camera Session
// =============================================================================

/// Opens the scanning camera session.
pub fn open_camera(ctx: &AppContext) -> AppResult<()> {
    ctx.sales.with_mut(|s| {
        s.camera_open = true;
        s.pending = None;
    });
    debug!("sales camera opened");
    Ok(())
}

/// Tears the camera session down. The cart is transient; it dies with
/// the session.
pub fn close_camera(ctx: &AppContext) {
    ctx.sales.with_mut(|s| {
        s.cart.clear();
        s.pending = None;
        s.scan_in_flight = false;
        s.camera_open = false;
    });
    debug!("sales camera closed");
}

/// Current cart summary.
pub fn cart_view(ctx: &AppContext) -> CartView {
    ctx.sales.with(|s| CartView::of(&s.cart))
}

// =============================================================================
// Scan
// =============================================================================

/// Sends one captured frame to the recognition backend.
///
/// The scan control stays disabled (`scan_in_flight`) until the call
/// resolves. `Ok(None)` is a clean no-match: the cart is untouched and
/// nothing is appended anywhere.
pub async fn scan(ctx: &AppContext, frame_jpeg: &[u8]) -> AppResult<Option<ScanMatch>> {
    ctx.sales.with_mut(|s| {
        if !s.camera_open {
            return Err(AppError::new(ErrorCode::BusinessLogic, "Camera is not open"));
        }
        if s.scan_in_flight {
            return Err(AppError::in_flight("Scan"));
        }
        s.scan_in_flight = true;
        Ok(())
    })?;

    let frame = encode_frame(frame_jpeg);
    let result = ctx.recognizer.scan(&ctx.shop.shop_id, &frame).await;

    ctx.sales.with_mut(|s| {
        s.scan_in_flight = false;
        if let Ok(best) = &result {
            s.pending = best.clone();
        }
    });

    match result {
        Ok(Some(m)) => {
            debug!(item_id = %m.item_id, score = m.score, "scan matched");
            Ok(Some(m))
        }
        Ok(None) => {
            debug!("scan: no match");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Accepts the pending match with a prompted quantity.
///
/// Same item id already in the cart → its quantity increments; otherwise
/// a new line is appended. An invalid quantity leaves the candidate
/// pending so the user can re-enter.
pub fn accept(ctx: &AppContext, quantity_text: &str) -> AppResult<CartView> {
    let quantity = validation::parse_quantity(quantity_text)?;

    ctx.sales.with_mut(|s| {
        let m = s.pending.take().ok_or_else(|| {
            AppError::new(ErrorCode::BusinessLogic, "No scanned match to accept")
        })?;
        s.cart.add_match(&m, quantity);
        Ok(CartView::of(&s.cart))
    })
}

/// Discards the pending candidate. No cart mutation.
pub fn reject(ctx: &AppContext) {
    ctx.sales.with_mut(|s| s.pending = None);
}

// =============================================================================
// Checkout
// =============================================================================

/// One line that failed to commit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFailure {
    pub line: CartLine,
    pub error: String,
}

/// What a checkout run produced. `receipt` is present only on full
/// success; a partial run lists exactly which lines failed (the committed
/// ones have already left the cart).
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub receipt: Option<Receipt>,
    pub committed: Vec<CartLine>,
    pub failed: Vec<CheckoutFailure>,
}

impl CheckoutOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Commits the cart: one independent sale append per line, in cart order,
/// all sharing one receipt id.
pub async fn checkout(ctx: &AppContext, method: PaymentMethod) -> AppResult<CheckoutOutcome> {
    let lines = ctx.sales.with_mut(|s| {
        if s.checkout_in_flight {
            return Err(AppError::in_flight("Checkout"));
        }
        if s.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        s.checkout_in_flight = true;
        Ok(s.cart.lines.clone())
    })?;

    let sold_by = ctx
        .identity
        .display_name()
        .await
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

    let now = Utc::now();
    let receipt_id = new_receipt_id(now);
    info!(receipt_id = %receipt_id, lines = lines.len(), method = method.as_str(), "checkout started");

    let mut committed: Vec<CartLine> = Vec::new();
    let mut failed: Vec<CheckoutFailure> = Vec::new();

    for line in &lines {
        let txn = match ledger::prepare_sale(
            line.quantity,
            line.sell_price,
            method,
            &receipt_id,
            &sold_by,
            now,
        ) {
            Ok(txn) => txn,
            Err(e) => {
                failed.push(CheckoutFailure {
                    line: line.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        match ctx
            .store
            .append_transaction(&ctx.shop.shop_id, &line.category_id, &line.item_id, txn)
            .await
        {
            Ok(updated) => {
                if let Err(fault) = ledger::audit(&updated) {
                    warn!(%fault, "stock integrity warning");
                }
                // Committed lines leave the cart at once, so a retry after
                // a later failure cannot double-submit them
                ctx.sales.with_mut(|s| s.cart.remove_line(&line.item_id));
                committed.push(line.clone());
                debug!(item_id = %line.item_id, quantity = line.quantity, "line committed");
            }
            Err(e) => {
                warn!(item_id = %line.item_id, error = %e, "line commit failed; continuing");
                failed.push(CheckoutFailure {
                    line: line.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    if failed.is_empty() {
        // Receipt reflects exactly what was submitted, never a read-back
        let receipt = Receipt::from_submission(receipt_id, lines, method, sold_by, now);
        ctx.sales.with_mut(|s| {
            s.cart.clear();
            s.pending = None;
            s.camera_open = false;
            s.checkout_in_flight = false;
        });
        info!(receipt_id = %receipt.receipt_id, total = %receipt.total, "sale complete");
        Ok(CheckoutOutcome {
            receipt: Some(receipt),
            committed,
            failed,
        })
    } else {
        ctx.sales.with_mut(|s| s.checkout_in_flight = false);
        warn!(
            committed = committed.len(),
            failed = failed.len(),
            "checkout finished with failures"
        );
        Ok(CheckoutOutcome {
            receipt: None,
            committed,
            failed,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{build_ctx, memory_store, scan_match, seed_sales_catalog, StubCamera,
        StubRecognizer};
    use keeper_core::TransactionKind;
    use keeper_store::ItemStore;

    /// Bread 2.50 × 3 + Milk 1.20 × 2 → total 9.90; commit
    /// appends sale transactions −3 and −2 sharing one receipt id.
    #[tokio::test]
    async fn test_full_checkout() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(
            store.clone(),
            StubCamera::cancelling(),
            StubRecognizer::matching(scan_match("bread", "Bread", 250)),
        );

        open_camera(&ctx).unwrap();

        let m = scan(&ctx, b"frame-bytes").await.unwrap().unwrap();
        assert_eq!(m.item_id, "bread");
        accept(&ctx, "3").unwrap();

        ctx.sales
            .with_mut(|s| s.pending = Some(scan_match("milk", "Milk", 120)));
        let view = accept(&ctx, "2").unwrap();
        assert_eq!(view.badge_count, 5);
        assert_eq!(view.total.cents(), 990);

        let outcome = checkout(&ctx, PaymentMethod::Cash).await.unwrap();
        assert!(outcome.is_complete());

        let receipt = outcome.receipt.unwrap();
        assert_eq!(receipt.total.cents(), 990);
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.sold_by, "Amina");

        // Both ledgers got one sale entry, sharing the receipt id
        let bread = store.get_item("shop-1", "cat-1", "bread").await.unwrap().unwrap();
        let milk = store.get_item("shop-1", "cat-1", "milk").await.unwrap().unwrap();

        assert_eq!(bread.stock, 7);
        assert_eq!(milk.stock, 8);

        let bread_sale = bread.stock_transactions.last().unwrap();
        let milk_sale = milk.stock_transactions.last().unwrap();
        assert_eq!(bread_sale.quantity, -3);
        assert_eq!(milk_sale.quantity, -2);
        assert_eq!(bread_sale.kind, TransactionKind::Sale);
        assert_eq!(bread_sale.receipt_id, milk_sale.receipt_id);
        assert_eq!(bread_sale.receipt_id.as_deref(), Some(receipt.receipt_id.as_str()));
        assert_eq!(bread_sale.payment_method, Some(PaymentMethod::Cash));
        assert!(keeper_core::ledger::audit(&bread).is_ok());
        assert!(keeper_core::ledger::audit(&milk).is_ok());

        // Cart cleared, camera torn down
        ctx.sales.with(|s| {
            assert!(s.cart.is_empty());
            assert!(!s.camera_open);
        });
    }

    /// `{match: null}` leaves the cart unchanged and
    /// appends nothing.
    #[tokio::test]
    async fn test_scan_no_match_changes_nothing() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(
            store.clone(),
            StubCamera::cancelling(),
            StubRecognizer::no_match(),
        );

        open_camera(&ctx).unwrap();
        let result = scan(&ctx, b"frame").await.unwrap();
        assert!(result.is_none());

        ctx.sales.with(|s| {
            assert!(s.cart.is_empty());
            assert!(s.pending.is_none());
        });
        let bread = store.get_item("shop-1", "cat-1", "bread").await.unwrap().unwrap();
        assert!(bread.stock_transactions.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_accept_increments_line() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(
            store,
            StubCamera::cancelling(),
            StubRecognizer::matching(scan_match("bread", "Bread", 250)),
        );

        open_camera(&ctx).unwrap();
        scan(&ctx, b"f").await.unwrap();
        accept(&ctx, "2").unwrap();
        scan(&ctx, b"f").await.unwrap();
        let view = accept(&ctx, "3").unwrap();

        assert_eq!(view.line_count, 1);
        assert_eq!(view.badge_count, 5);
    }

    #[tokio::test]
    async fn test_reject_discards_candidate() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(
            store,
            StubCamera::cancelling(),
            StubRecognizer::matching(scan_match("bread", "Bread", 250)),
        );

        open_camera(&ctx).unwrap();
        scan(&ctx, b"f").await.unwrap();
        reject(&ctx);

        let err = accept(&ctx, "1").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::BusinessLogic);
        ctx.sales.with(|s| assert!(s.cart.is_empty()));
    }

    #[tokio::test]
    async fn test_invalid_quantity_keeps_candidate_pending() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(
            store,
            StubCamera::cancelling(),
            StubRecognizer::matching(scan_match("bread", "Bread", 250)),
        );

        open_camera(&ctx).unwrap();
        scan(&ctx, b"f").await.unwrap();

        assert!(accept(&ctx, "zero").is_err());
        assert!(accept(&ctx, "-2").is_err());

        // Candidate survived; a corrected entry still lands
        let view = accept(&ctx, "2").unwrap();
        assert_eq!(view.badge_count, 2);
    }

    /// Partial failure: the loop continues, earlier commits stand, the
    /// committed line leaves the cart, and a retry re-submits only the
    /// failed remainder under a fresh receipt id.
    #[tokio::test]
    async fn test_partial_checkout_and_retry() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(
            store.clone(),
            StubCamera::cancelling(),
            StubRecognizer::no_match(),
        );

        open_camera(&ctx).unwrap();
        ctx.sales.with_mut(|s| {
            s.cart.add_match(&scan_match("bread", "Bread", 250), 3);
            s.cart.add_match(&scan_match("milk", "Milk", 120), 2);
        });

        store.fail_next_append("milk");
        let outcome = checkout(&ctx, PaymentMethod::Mpesa).await.unwrap();

        assert!(!outcome.is_complete());
        assert!(outcome.receipt.is_none());
        assert_eq!(outcome.committed.len(), 1);
        assert_eq!(outcome.committed[0].item_id, "bread");
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].line.item_id, "milk");

        // Bread is committed and gone from the cart; milk remains
        let bread = store.get_item("shop-1", "cat-1", "bread").await.unwrap().unwrap();
        assert_eq!(bread.stock, 7);
        let first_receipt = bread.stock_transactions.last().unwrap().receipt_id.clone();
        ctx.sales.with(|s| {
            assert_eq!(s.cart.line_count(), 1);
            assert_eq!(s.cart.lines[0].item_id, "milk");
            assert!(s.camera_open);
        });

        // Retry commits only milk, under a new receipt id
        let outcome = checkout(&ctx, PaymentMethod::Mpesa).await.unwrap();
        assert!(outcome.is_complete());

        let bread = store.get_item("shop-1", "cat-1", "bread").await.unwrap().unwrap();
        let milk = store.get_item("shop-1", "cat-1", "milk").await.unwrap().unwrap();
        // No double-commit of the already-sold bread
        assert_eq!(bread.stock, 7);
        assert_eq!(bread.stock_transactions.len(), 1);
        assert_eq!(milk.stock, 8);
        assert_ne!(
            milk.stock_transactions.last().unwrap().receipt_id,
            first_receipt
        );
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_refused() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(store, StubCamera::cancelling(), StubRecognizer::no_match());

        open_camera(&ctx).unwrap();
        let err = checkout(&ctx, PaymentMethod::Card).await.unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_close_camera_discards_cart() {
        let store = memory_store();
        seed_sales_catalog(&store).await;
        let (ctx, _queue) = build_ctx(store, StubCamera::cancelling(), StubRecognizer::no_match());

        open_camera(&ctx).unwrap();
        ctx.sales
            .with_mut(|s| s.cart.add_match(&scan_match("bread", "Bread", 250), 1));

        close_camera(&ctx);
        ctx.sales.with(|s| {
            assert!(s.cart.is_empty());
            assert!(!s.camera_open);
        });
    }
}
