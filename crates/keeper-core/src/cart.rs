//! # Sales Cart
//!
//! The in-memory cart a scanning session accumulates, and the receipt
//! artifact a checkout produces.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Lifecycle                                    │
//! │                                                                         │
//! │  scan accept ───────► add_line()  ── same item id? increment quantity  │
//! │                                   └─ otherwise append a new line       │
//! │                                                                         │
//! │  checkout commit ───► remove_line() per committed line                 │
//! │                       (a retry after partial failure only re-submits   │
//! │                        what actually failed)                           │
//! │                                                                         │
//! │  success / camera close ──► clear()                                    │
//! │                                                                         │
//! │  The cart has NO persisted form. It exists only inside the active      │
//! │  sales session; the ledger is the durable record.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, ScanMatch};

// =============================================================================
// Cart Line
// =============================================================================

/// One pending-sale line, created from an accepted scan match.
///
/// ## Design Notes
/// - Price and name are frozen at accept time; a later edit to the item
///   does not reprice lines already in the cart.
/// - `thumbnail` is best-effort; the checkout and receipt tolerate `None`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub item_id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub sell_price: Money,
    pub quantity: i64,
}

impl CartLine {
    /// `sell_price × quantity`.
    pub fn line_total(&self) -> Money {
        self.sell_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The active sales session's cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (accepting the same item again
///   increments its quantity)
/// - Quantities are ≥ 1 (validated before the line is created)
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds an accepted scan match with the prompted quantity.
    ///
    /// If the item is already in the cart its quantity is incremented;
    /// otherwise a new line is appended at the end (commit order is cart
    /// order).
    pub fn add_match(&mut self, m: &ScanMatch, quantity: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == m.item_id) {
            line.quantity += quantity;
            return;
        }

        self.lines.push(CartLine {
            item_id: m.item_id.clone(),
            category_id: m.category_id.clone(),
            name: m.name.clone(),
            thumbnail: m.thumbnail.clone(),
            sell_price: m.sell_price,
            quantity,
        });
    }

    /// Removes the line for `item_id` (used as each checkout line commits).
    pub fn remove_line(&mut self, item_id: &str) {
        self.lines.retain(|l| l.item_id != item_id);
    }

    /// Drops every line (checkout success or camera close).
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total unit count across lines; the camera overlay's badge number.
    pub fn badge_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checkout total: Σ `sell_price × quantity`.
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Generates a receipt id: `RCP-<epoch-millis>-<6 uppercase alphanumerics>`.
pub fn new_receipt_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("RCP-{}-{}", now.timestamp_millis(), suffix)
}

/// The receipt shown after a completed sale.
///
/// A pure presentation artifact: built from exactly what was submitted,
/// never re-queried from the store, so it reflects the sale as entered
/// even if a concurrent edit landed meanwhile.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub receipt_id: String,
    pub date: String,
    pub time: String,
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub sold_by: String,
}

impl Receipt {
    /// Builds the receipt from the submitted cart snapshot.
    pub fn from_submission(
        receipt_id: String,
        lines: Vec<CartLine>,
        payment_method: PaymentMethod,
        sold_by: String,
        now: DateTime<Utc>,
    ) -> Self {
        let total = lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total());

        Receipt {
            receipt_id,
            date: now.format("%m/%d/%Y").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            lines,
            total,
            payment_method,
            sold_by,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_match(id: &str, name: &str, price_cents: i64) -> ScanMatch {
        ScanMatch {
            item_id: id.to_string(),
            category_id: "cat-1".to_string(),
            name: name.to_string(),
            score: 0.9,
            thumbnail: None,
            sell_price: Money::from_cents(price_cents),
        }
    }

    #[test]
    fn test_add_new_lines() {
        let mut cart = Cart::new();
        cart.add_match(&scan_match("i1", "Bread", 250), 3);
        cart.add_match(&scan_match("i2", "Milk", 120), 2);

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.badge_count(), 5);
    }

    #[test]
    fn test_repeat_accept_increments_quantity() {
        let mut cart = Cart::new();
        cart.add_match(&scan_match("i1", "Bread", 250), 2);
        cart.add_match(&scan_match("i1", "Bread", 250), 3);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].quantity, 5);
    }

    /// Bread 2.50 × 3 + Milk 1.20 × 2 totals exactly 9.90.
    #[test]
    fn test_checkout_total() {
        let mut cart = Cart::new();
        cart.add_match(&scan_match("i1", "Bread", 250), 3);
        cart.add_match(&scan_match("i2", "Milk", 120), 2);

        assert_eq!(cart.total().cents(), 990);
    }

    #[test]
    fn test_remove_line_and_clear() {
        let mut cart = Cart::new();
        cart.add_match(&scan_match("i1", "Bread", 250), 3);
        cart.add_match(&scan_match("i2", "Milk", 120), 2);

        cart.remove_line("i1");
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].item_id, "i2");

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_receipt_id_format() {
        let now = Utc::now();
        let id = new_receipt_id(now);
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "RCP");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_receipt_reflects_submission_not_store() {
        let mut cart = Cart::new();
        cart.add_match(&scan_match("i1", "Bread", 250), 3);

        let now = Utc::now();
        let receipt = Receipt::from_submission(
            "RCP-1-AAAAAA".to_string(),
            cart.lines.clone(),
            PaymentMethod::Cash,
            "Amina".to_string(),
            now,
        );

        assert_eq!(receipt.total.cents(), 750);
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.sold_by, "Amina");
        assert_eq!(receipt.payment_method, PaymentMethod::Cash);
    }
}
