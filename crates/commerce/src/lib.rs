//! Quince Commerce - domain logic.
//!
//! This crate implements the commerce core behind the Quince API:
//!
//! - [`models`] - entity records (users, products, categories, orders,
//!   carts, addresses) and their derived-value helpers
//! - [`store`] - arena-style in-memory store: entities keyed by typed IDs,
//!   unique-key indexes, and an explicit unit-of-work with commit/rollback
//! - [`services`] - orchestrating operations: account security state,
//!   catalog and inventory, order lifecycle, cart aggregation
//! - [`config`] - tunable thresholds (lockout, minimum stock, password length)
//! - [`error`] - the domain error taxonomy
//! - [`page`] - pagination for list operations
//!
//! The crate is synchronous and free of I/O apart from the in-process store;
//! HTTP, identity resolution and email delivery live in collaborating crates.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod page;
pub mod services;
pub mod store;

pub use config::CommerceConfig;
pub use error::{CommerceError, Result};
pub use page::{Page, PageRequest};
pub use store::Store;
