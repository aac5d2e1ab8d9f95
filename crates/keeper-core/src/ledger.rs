//! # Stock Ledger
//!
//! Pure half of the Transaction Ledger Engine: transaction construction,
//! validation, cache application and the integrity audit.
//!
//! ## Ledger Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ledger Append Flow                               │
//! │                                                                         │
//! │  UI action (Add Stock / Complete Sale)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  prepare_stock_in / prepare_sale  ← THIS MODULE (validate + build)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ItemStore::append_transaction    ← ONE persistence write:             │
//! │       │                             log entry + stock increment        │
//! │       ▼                             land together                      │
//! │  apply(item, txn)                 ← local cache, only after the        │
//! │       │                             write confirmed                    │
//! │       ▼                                                                 │
//! │  audit(item)                      ← Σ log == cached stock?             │
//! │                                     mismatch → warn, never block       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The log is append-only. Stock is adjusted exclusively by appends,
//! never recomputed by overwriting the log, never edited in place.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{CoreResult, IntegrityFault, ValidationError};
use crate::money::Money;
use crate::types::{Item, PaymentMethod, StockTransaction, TransactionKind};

/// Length of the random id suffix.
///
/// Six alphanumerics on top of epoch-millis keeps collision odds
/// negligible for any realistic burst of appends within one session.
const ID_SUFFIX_LEN: usize = 6;

// =============================================================================
// Id Generation
// =============================================================================

/// Generates a transaction id: `<kind>_<epoch-millis>_<6 alphanumerics>`.
///
/// Not cryptographically strong, and doesn't need to be; the contract is
/// uniqueness within a session of rapid calls, which the random suffix
/// provides even when two appends share a millisecond.
pub fn new_transaction_id(kind: TransactionKind, now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("{}_{}_{}", kind.id_prefix(), now.timestamp_millis(), suffix)
}

/// Display date recorded on transactions (`MM/DD/YYYY`).
fn display_date(now: DateTime<Utc>) -> String {
    now.format("%m/%d/%Y").to_string()
}

// =============================================================================
// Transaction Construction
// =============================================================================

/// Builds a validated restock transaction.
///
/// ## Validation
/// - `quantity` must be strictly positive; zero or negative restocks are
///   rejected before anything is built, so a rejected call leaves no log
///   entry and no stock change.
pub fn prepare_stock_in(
    quantity: i64,
    added_by: &str,
    now: DateTime<Utc>,
) -> CoreResult<StockTransaction> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    Ok(StockTransaction {
        id: new_transaction_id(TransactionKind::StockIn, now),
        quantity,
        date: display_date(now),
        timestamp: now.timestamp_millis(),
        kind: TransactionKind::StockIn,
        added_by: Some(added_by.to_string()),
        sold_by: None,
        sell_price: None,
        total_amount: None,
        payment_method: None,
        receipt_id: None,
    })
}

/// Builds a validated sale transaction for one cart line.
///
/// `quantity` is the number of units sold (≥ 1); the ledger entry carries
/// the negation. Price, payment method and the checkout's shared receipt
/// id are frozen onto the entry.
pub fn prepare_sale(
    quantity: i64,
    sell_price: Money,
    payment_method: PaymentMethod,
    receipt_id: &str,
    sold_by: &str,
    now: DateTime<Utc>,
) -> CoreResult<StockTransaction> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    Ok(StockTransaction {
        id: new_transaction_id(TransactionKind::Sale, now),
        quantity: -quantity,
        date: display_date(now),
        timestamp: now.timestamp_millis(),
        kind: TransactionKind::Sale,
        added_by: None,
        sold_by: Some(sold_by.to_string()),
        sell_price: Some(sell_price),
        total_amount: Some(sell_price.multiply_quantity(quantity)),
        payment_method: Some(payment_method),
        receipt_id: Some(receipt_id.to_string()),
    })
}

// =============================================================================
// Cache Application
// =============================================================================

/// Applies a persisted transaction to the locally cached item.
///
/// Call this only after the store write confirmed; there is no
/// optimistic update; a failed write must leave the cache untouched.
pub fn apply(item: &mut Item, txn: StockTransaction) {
    item.stock += txn.quantity;
    item.last_transaction_id = Some(txn.id.clone());
    item.last_stock_update = Some(txn.timestamp);
    item.updated_at = Some(txn.timestamp);
    item.stock_transactions.push(txn);
}

// =============================================================================
// Integrity Audit
// =============================================================================

/// Sum of the signed quantities in the item's transaction log.
pub fn ledger_sum(item: &Item) -> i64 {
    item.stock_transactions.iter().map(|t| t.quantity).sum()
}

/// Verifies the stock invariant: cached `stock` equals the ledger sum.
///
/// A mismatch is returned as a typed fault for the caller to log; it is
/// observable, never fatal, and never silently repaired.
pub fn audit(item: &Item) -> Result<(), IntegrityFault> {
    let computed = ledger_sum(item);
    if computed == item.stock {
        Ok(())
    } else {
        Err(IntegrityFault {
            item_id: item.id.clone(),
            cached: item.stock,
            computed,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn item() -> Item {
        Item {
            id: "item-1".to_string(),
            name: "Bread".to_string(),
            category_id: "cat-1".to_string(),
            ancestors: vec![],
            full_path: "Bakery > Bread".to_string(),
            images: vec![],
            buy_price: None,
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
    fn test_id_format() {
        let now = Utc::now();
        let id = new_transaction_id(TransactionKind::StockIn, now);
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "stock");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));

        let sale = new_transaction_id(TransactionKind::Sale, now);
        assert!(sale.starts_with("sale_"));
    }

    /// Rapid calls within the same millisecond must not collide.
    #[test]
    fn test_ids_unique_under_rapid_calls() {
        let now = Utc::now();
        let ids: HashSet<String> = (0..1000)
            .map(|_| new_transaction_id(TransactionKind::Sale, now))
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    /// After every append, stock == Σ quantity.
    #[test]
    fn test_stock_equals_ledger_sum_after_each_append() {
        let mut item = item();
        let now = Utc::now();

        let deltas: [(bool, i64); 5] = [
            (true, 10),
            (true, 3),
            (false, 4),
            (true, 7),
            (false, 2),
        ];

        for (is_stock_in, qty) in deltas {
            let txn = if is_stock_in {
                prepare_stock_in(qty, "Staff", now).unwrap()
            } else {
                prepare_sale(qty, Money::from_cents(250), PaymentMethod::Cash, "RCP-1-X", "Staff", now)
                    .unwrap()
            };
            apply(&mut item, txn);
            assert_eq!(item.stock, ledger_sum(&item));
            assert!(audit(&item).is_ok());
        }

        assert_eq!(item.stock, 14);
    }

    /// A restock with quantity ≤ 0 is rejected and produces
    /// no log entry and no stock change.
    #[test]
    fn test_non_positive_restock_rejected() {
        let item = item();
        let now = Utc::now();

        assert!(prepare_stock_in(0, "Staff", now).is_err());
        assert!(prepare_stock_in(-5, "Staff", now).is_err());

        assert!(item.stock_transactions.is_empty());
        assert_eq!(item.stock, 0);
    }

    #[test]
    fn test_sale_rejects_non_positive_quantity() {
        let now = Utc::now();
        assert!(
            prepare_sale(0, Money::from_cents(100), PaymentMethod::Cash, "RCP-1-X", "Staff", now)
                .is_err()
        );
        assert!(
            prepare_sale(-1, Money::from_cents(100), PaymentMethod::Cash, "RCP-1-X", "Staff", now)
                .is_err()
        );
    }

    #[test]
    fn test_sale_entry_fields() {
        let now = Utc::now();
        let txn = prepare_sale(
            3,
            Money::from_cents(250),
            PaymentMethod::Mpesa,
            "RCP-7-ABCDEF",
            "Amina",
            now,
        )
        .unwrap();

        assert_eq!(txn.quantity, -3);
        assert_eq!(txn.kind, TransactionKind::Sale);
        assert_eq!(txn.sell_price, Some(Money::from_cents(250)));
        assert_eq!(txn.total_amount, Some(Money::from_cents(750)));
        assert_eq!(txn.payment_method, Some(PaymentMethod::Mpesa));
        assert_eq!(txn.receipt_id.as_deref(), Some("RCP-7-ABCDEF"));
        assert_eq!(txn.sold_by.as_deref(), Some("Amina"));
        assert!(txn.added_by.is_none());
    }

    #[test]
    fn test_apply_updates_bookkeeping_fields() {
        let mut item = item();
        let now = Utc::now();
        let txn = prepare_stock_in(10, "Staff", now).unwrap();
        let txn_id = txn.id.clone();

        apply(&mut item, txn);

        assert_eq!(item.stock, 10);
        assert_eq!(item.last_transaction_id, Some(txn_id));
        assert_eq!(item.last_stock_update, Some(now.timestamp_millis()));
        assert_eq!(item.updated_at, Some(now.timestamp_millis()));
    }

    #[test]
    fn test_audit_detects_divergence() {
        let mut item = item();
        let now = Utc::now();
        apply(&mut item, prepare_stock_in(10, "Staff", now).unwrap());

        // Simulate a corrupted cache total
        item.stock = 12;

        let fault = audit(&item).unwrap_err();
        assert_eq!(fault.cached, 12);
        assert_eq!(fault.computed, 10);
        assert_eq!(fault.item_id, "item-1");
    }
}
