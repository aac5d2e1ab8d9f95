//! # Change Feed
//!
//! The live-query subscription: the store broadcasts a coarse change
//! event after every successful write, and the catalog layer rebuilds its
//! tree snapshot on receipt. The feed carries no per-record detail;
//! subscribers refresh from a full list call.

use tokio::sync::broadcast;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Category,
    Item,
    Shop,
}

/// One change-feed notification.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub shop_id: String,
    pub kind: ChangeKind,
}

/// Receiver half of the feed, as handed to subscribers.
pub type StoreEvents = broadcast::Receiver<StoreEvent>;
