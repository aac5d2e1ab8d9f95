//! # Domain Types
//!
//! Core domain types used throughout Keeper.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────┐      │
//! │  │    Category     │   │      Item       │   │ StockTransaction │      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────  │      │
//! │  │  id             │   │  id             │   │  id (typed)      │      │
//! │  │  parent_id      │   │  category_id    │   │  quantity (±)    │      │
//! │  │  ancestors      │   │  images (≤2)    │   │  kind            │      │
//! │  │  full_path      │   │  stock + log    │   │  receipt_id?     │      │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────┘      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────┐      │
//! │  │ TransactionKind │   │ PaymentMethod   │   │    ScanMatch     │      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────  │      │
//! │  │  StockIn        │   │  Cash  Mpesa    │   │  recognition     │      │
//! │  │  Sale           │   │  Card  Credit   │   │  best-match hit  │      │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Compatibility
//! Field names serialize to the document schema the shop records already
//! use (`parentId`, `fullPath`, `stockTransactions`, `lastStockUpdate`,
//! …), so a record round-trips without a migration. Timestamps are epoch
//! milliseconds on the wire for the same reason.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::MAX_ITEM_IMAGES;

// =============================================================================
// Path Segment
// =============================================================================

/// One hop of a category ancestry chain: `{id, name}`.
///
/// Categories and items both carry a denormalized `ancestors` list so the
/// UI can render breadcrumbs without walking the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PathSegment {
    pub id: String,
    pub name: String,
}

impl PathSegment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        PathSegment {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A node of the shop's category tree.
///
/// ## Invariants
/// - `full_path` is always the `" > "`-joined ancestor names plus own name
/// - a category is a *leaf* iff no other category names it as parent
/// - items attach only to leaf categories
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the tree and in breadcrumbs.
    pub name: String,

    /// Parent category, `None` for roots.
    pub parent_id: Option<String>,

    /// Denormalized ancestor chain, root first.
    #[serde(default)]
    pub ancestors: Vec<PathSegment>,

    /// `" > "`-joined ancestor names plus own name.
    pub full_path: String,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,

    /// Last update time, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

// =============================================================================
// Item
// =============================================================================

/// A sellable item attached to a leaf category.
///
/// ## Stock Invariant
/// `stock` is a cached total and MUST equal the sum of `quantity` over
/// `stock_transactions`. The ledger engine keeps the two together; any
/// divergence is surfaced as an [`IntegrityFault`](crate::IntegrityFault).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Owning (leaf) category.
    pub category_id: String,

    /// Denormalized ancestor chain including the owning category, root first.
    #[serde(default)]
    pub ancestors: Vec<PathSegment>,

    /// `" > "`-joined ancestor names plus own name.
    pub full_path: String,

    /// Photo URLs, at most two, slot-ordered (index 0 then index 1).
    #[serde(default)]
    pub images: Vec<String>,

    /// Purchase price; unset until the price-ensure step runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_price: Option<Money>,

    /// Selling price; unset until the price-ensure step runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<Money>,

    /// Cached stock total. Derived from the transaction log, never edited
    /// directly.
    #[serde(default)]
    pub stock: i64,

    /// Append-only transaction log. No in-place edits or deletes.
    #[serde(default)]
    pub stock_transactions: Vec<StockTransaction>,

    /// Id of the most recent transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transaction_id: Option<String>,

    /// Time of the most recent stock mutation, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stock_update: Option<i64>,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,

    /// Last update time, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Item {
    /// True once both photo slots are filled.
    #[inline]
    pub fn has_both_images(&self) -> bool {
        self.images.len() >= MAX_ITEM_IMAGES
    }

    /// True while at least one of buy/sell price is unset.
    ///
    /// The price-ensure step runs exactly when this holds after the second
    /// photo lands.
    #[inline]
    pub fn needs_prices(&self) -> bool {
        self.buy_price.is_none() || self.sell_price.is_none()
    }

    /// The last `n` transactions, newest first (the detail view shows 3).
    pub fn recent_transactions(&self, n: usize) -> Vec<&StockTransaction> {
        self.stock_transactions.iter().rev().take(n).collect()
    }
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// What a ledger entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TransactionKind {
    /// Restock: positive quantity, recorded with `added_by`.
    StockIn,
    /// Sale: negative quantity, recorded with `sold_by` and payment data.
    Sale,
}

impl TransactionKind {
    /// Id prefix: transaction ids look like `stock_<millis>_<rand>` and
    /// `sale_<millis>_<rand>`.
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            TransactionKind::StockIn => "stock",
            TransactionKind::Sale => "sale",
        }
    }
}

// =============================================================================
// Stock Transaction
// =============================================================================

/// One immutable entry of an item's stock ledger.
///
/// The log is append-only; `quantity` is signed (positive stock-in,
/// negative sale). Sale entries additionally carry the price, payment
/// method and the receipt that grouped them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockTransaction {
    /// Unique id: `<kind>_<epoch-millis>_<6 random alphanumerics>`.
    pub id: String,

    /// Signed quantity delta.
    pub quantity: i64,

    /// Human-readable transaction date (display only).
    pub date: String,

    /// Epoch milliseconds.
    pub timestamp: i64,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Who restocked (stock-in entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,

    /// Who sold (sale entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_by: Option<String>,

    /// Unit price at time of sale (frozen).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<Money>,

    /// `sell_price × quantity sold` at time of sale (frozen).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    /// Receipt shared by every line of one checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// The fixed payment-method set offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// M-Pesa mobile money.
    Mpesa,
    /// Card payment on external terminal.
    Card,
    /// Credit (pay later).
    Credit,
}

impl PaymentMethod {
    /// Every accepted method, in checkout display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Mpesa,
        PaymentMethod::Card,
        PaymentMethod::Credit,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Card => "card",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "mpesa" => Ok(PaymentMethod::Mpesa),
            "card" => Ok(PaymentMethod::Card),
            "credit" => Ok(PaymentMethod::Credit),
            _ => Err(crate::ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().into()).collect(),
            }),
        }
    }
}

// =============================================================================
// Scan Match
// =============================================================================

/// The recognition backend's best match for a scanned frame.
///
/// Wire names follow the backend response verbatim (`item_id`,
/// `category_id`, `sellPrice`).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanMatch {
    pub item_id: String,
    pub category_id: String,
    pub name: String,

    /// Cosine-similarity score in [0, 1]; thresholding happened backend-side.
    pub score: f64,

    /// First item photo, if the backend had one.
    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(rename = "sellPrice", default)]
    pub sell_price: Money,
}

// =============================================================================
// Shop Identity
// =============================================================================

/// The signed-in shop, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShopIdentity {
    /// Unique shop id (also the document-store partition key).
    pub shop_id: String,

    /// Display name; staff attribution on transactions falls back to this.
    pub shop_name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
