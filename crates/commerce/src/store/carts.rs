//! Shopping cart operations.
//!
//! Cart totals are never stored; [`State::cart_summary`] derives them on
//! every read from the lines and the current product prices.

use chrono::Utc;
use rust_decimal::Decimal;

use quince_core::{money, UserId};

use crate::error::{CommerceError, Result};
use crate::models::{CartLineView, CartSummary, ShoppingCart};

use super::State;

impl State {
    /// Create the cart for a user (one per user, made at registration).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist and `Conflict` if the
    /// user already has a cart.
    pub fn create_cart(&mut self, user_id: UserId) -> Result<ShoppingCart> {
        if !self.users.contains_key(&user_id) {
            return Err(CommerceError::not_found("user", user_id));
        }
        if self.carts.contains_key(&user_id) {
            return Err(CommerceError::conflict(format!(
                "cart already exists for user {user_id}"
            )));
        }

        let cart = ShoppingCart::empty(user_id, Utc::now());
        self.carts.insert(user_id, cart.clone());
        Ok(cart)
    }

    /// A user's cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no cart.
    pub fn get_cart(&self, user_id: UserId) -> Result<ShoppingCart> {
        self.carts
            .get(&user_id)
            .cloned()
            .ok_or_else(|| CommerceError::not_found("cart", user_id))
    }

    /// Persist an updated cart, refreshing the `updated_at` stamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no cart.
    pub fn update_cart(&mut self, mut cart: ShoppingCart) -> Result<ShoppingCart> {
        if !self.carts.contains_key(&cart.user_id) {
            return Err(CommerceError::not_found("cart", cart.user_id));
        }
        cart.updated_at = Utc::now();
        self.carts.insert(cart.user_id, cart.clone());
        Ok(cart)
    }

    /// Derive a cart's totals against current product prices.
    ///
    /// An empty cart totals exactly zero. Lines are resolved through the
    /// catalog; product deletion cascades into cart lines, so every line is
    /// expected to resolve.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no cart or a line's product is
    /// missing.
    pub fn cart_summary(&self, user_id: UserId) -> Result<CartSummary> {
        let cart = self.get_cart(user_id)?;

        let mut items = Vec::with_capacity(cart.items.len());
        let mut total_price = Decimal::ZERO;
        for line in &cart.items {
            let product = self.get_product(line.product_id)?;
            let line_total = money::line_total(product.price, line.quantity);
            total_price += line_total;
            items.push(CartLineView {
                product_id: product.id,
                product_name: product.name,
                product_sku: product.sku,
                unit_price: product.price,
                quantity: line.quantity,
                line_total,
            });
        }

        Ok(CartSummary {
            user_id,
            total_items_count: cart.total_items_count(),
            total_price: money::normalize(total_price),
            is_empty: cart.is_empty(),
            items,
        })
    }
}
