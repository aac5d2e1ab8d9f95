//! # Sales Session State
//!
//! The scanning camera's session: the cart, the match awaiting an
//! accept/reject decision, and the in-flight guards that model the
//! disabled scan/checkout buttons.

use std::sync::{Arc, Mutex};

use keeper_core::{Cart, ScanMatch};

/// Everything the active sales camera owns. The cart has no persisted
/// form; closing the camera discards it wholesale.
#[derive(Debug, Default)]
pub struct SalesSession {
    pub cart: Cart,

    /// The last scan's match, waiting on accept/reject.
    pub pending: Option<ScanMatch>,

    /// Disabled-button guard for the scan action.
    pub scan_in_flight: bool,

    /// Disabled-button guard for the checkout commit.
    pub checkout_in_flight: bool,

    pub camera_open: bool,
}

/// Shared sales-session handle (same locking discipline as
/// [`SessionState`](crate::state::SessionState)).
#[derive(Debug, Clone, Default)]
pub struct SalesState {
    inner: Arc<Mutex<SalesSession>>,
}

impl SalesState {
    pub fn new() -> Self {
        SalesState::default()
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SalesSession) -> R,
    {
        let session = self.inner.lock().expect("Sales mutex poisoned");
        f(&session)
    }

    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SalesSession) -> R,
    {
        let mut session = self.inner.lock().expect("Sales mutex poisoned");
        f(&mut session)
    }
}
