//! # Repository Traits
//!
//! The narrow contract the rest of Keeper holds against the document
//! store, one trait per entity family:
//!
//! - [`category::CategoryStore`] - category records
//! - [`item::ItemStore`] - item records + the atomic ledger append
//! - [`shop::ShopStore`] - the shop root record (display name)
//!
//! Production binds these to the managed store's SDK; tests and local
//! development bind them to [`MemoryStore`](crate::MemoryStore).

pub mod category;
pub mod item;
pub mod shop;

pub use category::CategoryStore;
pub use item::ItemStore;
pub use shop::ShopStore;
