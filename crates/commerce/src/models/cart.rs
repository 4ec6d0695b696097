//! Shopping cart records and the derived cart summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use quince_core::{ProductId, UserId};

/// A user's shopping cart.
///
/// One-to-one with the owning user and keyed by the user's ID. Totals are
/// never stored: they are derived on every read from the lines and the
/// current product prices (see [`CartSummary`]).
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingCart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShoppingCart {
    /// An empty cart for a freshly registered user.
    #[must_use]
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }
}

/// One line in a cart: a product reference plus quantity.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub product_id: ProductId,
    /// Always at least 1; zero-quantity lines are removed instead.
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// A cart with its totals resolved against current product prices.
///
/// Recomputed on every read; `total_price` of an empty cart is exactly zero.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub user_id: UserId,
    pub items: Vec<CartLineView>,
    pub total_items_count: u32,
    pub total_price: Decimal,
    pub is_empty: bool,
}

/// One cart line resolved against the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_sku: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// `quantity × unit_price` at current prices.
    pub line_total: Decimal,
}
