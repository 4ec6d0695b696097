//! Arena-style in-memory entity store with an explicit unit of work.
//!
//! Entities live in persistent maps keyed by typed IDs, with unique-key
//! indexes for the natural keys (username, email, SKU, slug, order number).
//! Entities reference each other by ID only; resolution is an explicit
//! lookup, never a live pointer.
//!
//! # Units of work
//!
//! Reads go through [`Store::snapshot`], which holds a shared guard.
//! Mutations go through [`Store::begin`], which takes the exclusive guard
//! and keeps an O(1) checkpoint of the pre-transaction state (the maps are
//! persistent structures, so the checkpoint is a cheap structural clone).
//! [`UnitOfWork::commit`] keeps the mutations; dropping the unit of work
//! without committing restores the checkpoint. Each orchestrating operation
//! runs exactly one unit of work and commits on its single success path.
//!
//! Because a unit of work holds the exclusive guard, conditional writes
//! such as the stock decrement are atomic with respect to other requests:
//! two simultaneous purchases cannot both observe the same stock level.
//!
//! The per-entity operations are implemented in the sibling modules
//! (`users`, `products`, `categories`, `orders`, `carts`, `addresses`) as
//! methods on [`State`].

pub mod addresses;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

pub use products::ProductSearch;

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use quince_core::{AddressId, CategoryId, OrderId, ProductId, UserId};

use crate::models::{Address, Category, Order, Product, ShoppingCart, User};

/// The complete entity arena.
///
/// Public so that [`Snapshot`] and [`UnitOfWork`] can deref to it, but the
/// fields stay private to this crate; all access goes through the entity
/// methods.
#[derive(Clone, Default)]
pub struct State {
    pub(crate) users: im::HashMap<UserId, User>,
    pub(crate) username_index: im::HashMap<String, UserId>,
    pub(crate) email_index: im::HashMap<String, UserId>,

    pub(crate) products: im::HashMap<ProductId, Product>,
    pub(crate) sku_index: im::HashMap<String, ProductId>,

    pub(crate) categories: im::HashMap<CategoryId, Category>,
    pub(crate) slug_index: im::HashMap<String, CategoryId>,

    pub(crate) orders: im::HashMap<OrderId, Order>,
    pub(crate) order_number_index: im::HashMap<String, OrderId>,

    /// Carts are one-to-one with users and keyed by the owner's ID.
    pub(crate) carts: im::HashMap<UserId, ShoppingCart>,

    pub(crate) addresses: im::HashMap<AddressId, Address>,

    pub(crate) sequences: Sequences,
}

/// Monotonic per-entity ID sequences.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Sequences {
    pub(crate) users: i64,
    pub(crate) products: i64,
    pub(crate) categories: i64,
    pub(crate) orders: i64,
    pub(crate) addresses: i64,
    pub(crate) reviews: i64,
}

impl Sequences {
    pub(crate) fn next(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// The entity store.
///
/// Cheaply cloneable; clones share the same underlying state.
#[derive(Clone, Default)]
pub struct Store {
    state: Arc<RwLock<State>>,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a read view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.state.read(),
        }
    }

    /// Begin a unit of work.
    ///
    /// Holds the exclusive guard until committed or dropped; dropping
    /// without [`UnitOfWork::commit`] rolls every mutation back.
    #[must_use]
    pub fn begin(&self) -> UnitOfWork<'_> {
        let state = self.state.write();
        let checkpoint = state.clone();
        UnitOfWork {
            state,
            checkpoint,
            committed: false,
        }
    }
}

/// A read-only view of the store.
pub struct Snapshot<'a> {
    state: RwLockReadGuard<'a, State>,
}

impl Deref for Snapshot<'_> {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

/// An exclusive transaction over the store.
///
/// All mutations applied through the deref'd [`State`] become durable on
/// [`commit`](Self::commit); if the unit of work is dropped first (the error
/// path of an operation), the pre-transaction checkpoint is restored.
pub struct UnitOfWork<'a> {
    state: RwLockWriteGuard<'a, State>,
    checkpoint: State,
    committed: bool,
}

impl UnitOfWork<'_> {
    /// Make the mutations of this unit of work durable.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl DerefMut for UnitOfWork<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.committed {
            *self.state = std::mem::take(&mut self.checkpoint);
        }
    }
}
