//! # Session State
//!
//! Explicit session/context objects for the two concurrent surfaces:
//!
//! - [`session`] - the category/item overlay session (item cache, overlay
//!   + capture state machines, edit buffer)
//! - [`sales`] - the scanning camera session (cart, pending match,
//!   in-flight guards)
//!
//! Both wrap their state in `Arc<Mutex>` handles with short, non-await
//! lock sections; teardown resets to the initial value.

pub mod sales;
pub mod session;

pub use sales::{SalesSession, SalesState};
pub use session::{EditBuffer, ItemContext, Session, SessionState};
