//! # Flows
//!
//! One module per user-facing flow, each a set of async functions over
//! [`AppContext`](crate::AppContext):
//!
//! - [`catalog`] - category/item CRUD, rename cascade, tree browser
//! - [`item_detail`] - open/close, edit/save, price-ensure, stock, embedder
//! - [`capture`] - the two-photo capture orchestration
//! - [`sales`] - scan → cart → checkout → receipt
//!
//! Every flow follows the same discipline: validate first (no partial
//! state on rejection), lock the session only outside awaits, persist
//! before mutating any cache, and guard re-entrant submissions with
//! in-flight flags.

pub mod capture;
pub mod catalog;
pub mod item_detail;
pub mod sales;
