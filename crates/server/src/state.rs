//! Application state shared across handlers.

use std::sync::Arc;

use quince_commerce::services::{
    AccountService, CartService, CatalogService, LogMailer, Mailer, OrderService,
};
use quince_commerce::{CommerceConfig, Store};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the entity store, the
/// commerce configuration, and the mailer collaborator.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Store,
    commerce_config: CommerceConfig,
    mailer: LogMailer,
}

impl AppState {
    /// Create application state around a store and configuration.
    #[must_use]
    pub fn new(store: Store, commerce_config: CommerceConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                commerce_config,
                mailer: LogMailer,
            }),
        }
    }

    /// Get a reference to the entity store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the commerce configuration.
    #[must_use]
    pub fn commerce_config(&self) -> &CommerceConfig {
        &self.inner.commerce_config
    }

    /// Get the mailer collaborator.
    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        &self.inner.mailer
    }

    /// Build an account service over this state.
    #[must_use]
    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self.store(), self.commerce_config(), self.mailer())
    }

    /// Build a catalog service over this state.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.store(), self.commerce_config())
    }

    /// Build an order service over this state.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.store(), self.mailer())
    }

    /// Build a cart service over this state.
    #[must_use]
    pub fn carts(&self) -> CartService<'_> {
        CartService::new(self.store())
    }
}
