//! Cart service.
//!
//! Mutations are last-write-wins; totals are derived on every read and
//! never cached.

use chrono::Utc;

use quince_core::{ProductId, UserId};

use crate::error::{CommerceError, Result};
use crate::models::{CartItem, CartSummary};
use crate::store::Store;

/// Shopping cart operations.
pub struct CartService<'a> {
    store: &'a Store,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// The user's cart with derived totals.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no cart.
    pub fn get_cart(&self, user_id: UserId) -> Result<CartSummary> {
        self.store.snapshot().cart_summary(user_id)
    }

    /// Add a product to the cart.
    ///
    /// An existing line for the product has the quantity added to it;
    /// otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero quantity, `NotFound` if the
    /// cart or product does not exist.
    pub fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartSummary> {
        if quantity == 0 {
            return Err(CommerceError::invalid("quantity must be at least 1"));
        }

        let mut uow = self.store.begin();
        uow.get_product(product_id)?;
        let mut cart = uow.get_cart(user_id)?;

        match cart
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            Some(item) => item.quantity += quantity,
            None => cart.items.push(CartItem {
                product_id,
                quantity,
                added_at: Utc::now(),
            }),
        }

        uow.update_cart(cart)?;
        let summary = uow.cart_summary(user_id)?;
        uow.commit();
        Ok(summary)
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero quantity (remove the line
    /// instead), `NotFound` if the cart or line does not exist.
    pub fn update_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartSummary> {
        if quantity == 0 {
            return Err(CommerceError::invalid("quantity must be at least 1"));
        }

        let mut uow = self.store.begin();
        let mut cart = uow.get_cart(user_id)?;

        let item = cart
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or_else(|| CommerceError::not_found("cart item", product_id))?;
        item.quantity = quantity;

        uow.update_cart(cart)?;
        let summary = uow.cart_summary(user_id)?;
        uow.commit();
        Ok(summary)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cart or line does not exist.
    pub fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<CartSummary> {
        let mut uow = self.store.begin();
        let mut cart = uow.get_cart(user_id)?;

        let before = cart.items.len();
        cart.items.retain(|item| item.product_id != product_id);
        if cart.items.len() == before {
            return Err(CommerceError::not_found("cart item", product_id));
        }

        uow.update_cart(cart)?;
        let summary = uow.cart_summary(user_id)?;
        uow.commit();
        Ok(summary)
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cart does not exist.
    pub fn clear(&self, user_id: UserId) -> Result<CartSummary> {
        let mut uow = self.store.begin();
        let mut cart = uow.get_cart(user_id)?;
        cart.items.clear();
        uow.update_cart(cart)?;
        let summary = uow.cart_summary(user_id)?;
        uow.commit();
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use quince_core::{Email, ProductStatus, Role, UserStatus};

    use super::*;
    use crate::models::{NewCategory, NewProduct, NewUser};

    struct Fixture {
        store: Store,
        user_id: UserId,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Store::new();
            let user_id = {
                let mut uow = store.begin();
                let user = uow
                    .create_user(NewUser {
                        username: "alice".to_owned(),
                        email: Email::parse("alice@x.com").unwrap(),
                        password_hash: "$argon2id$stub".to_owned(),
                        first_name: "Alice".to_owned(),
                        last_name: "Archer".to_owned(),
                        phone_number: None,
                        enabled: true,
                        email_verified: true,
                        status: UserStatus::Active,
                        roles: BTreeSet::from([Role::User]),
                    })
                    .unwrap();
                uow.create_cart(user.id).unwrap();
                uow.commit();
                user.id
            };
            Self { store, user_id }
        }

        fn service(&self) -> CartService<'_> {
            CartService::new(&self.store)
        }

        fn add_product(&self, sku: &str, price: Decimal) -> ProductId {
            let mut uow = self.store.begin();
            let category = match uow.find_category_by_slug("all") {
                Some(category) => category,
                None => uow
                    .create_category(NewCategory {
                        name: "All".to_owned(),
                        description: None,
                        slug: "all".to_owned(),
                        image_url: None,
                        active: true,
                        sort_order: 0,
                        parent_id: None,
                    })
                    .unwrap(),
            };
            let product = uow
                .create_product(NewProduct {
                    name: sku.to_owned(),
                    description: None,
                    sku: sku.to_owned(),
                    price,
                    cost: None,
                    stock_quantity: 100,
                    minimum_stock_level: 10,
                    active: true,
                    featured: false,
                    weight: None,
                    weight_unit: None,
                    dimensions: None,
                    brand: None,
                    model: None,
                    color: None,
                    size: None,
                    status: ProductStatus::Active,
                    category_id: category.id,
                    images: Vec::new(),
                })
                .unwrap();
            uow.commit();
            product.id
        }
    }

    #[test]
    fn test_two_line_cart_totals() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let first = fixture.add_product("A-1", dec!(10.00));
        let second = fixture.add_product("B-1", dec!(5.00));

        service.add_item(fixture.user_id, first, 2).unwrap();
        let summary = service.add_item(fixture.user_id, second, 3).unwrap();

        assert_eq!(summary.total_price, dec!(35.00));
        assert_eq!(summary.total_items_count, 5);
        assert!(!summary.is_empty);
    }

    #[test]
    fn test_empty_cart_total_is_exactly_zero() {
        let fixture = Fixture::new();
        let summary = fixture.service().get_cart(fixture.user_id).unwrap();
        assert!(summary.is_empty);
        assert_eq!(summary.total_price, Decimal::ZERO);
        assert_eq!(summary.total_items_count, 0);
    }

    #[test]
    fn test_adding_same_product_merges_lines() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let product = fixture.add_product("A-1", dec!(10.00));

        service.add_item(fixture.user_id, product, 2).unwrap();
        let summary = service.add_item(fixture.user_id, product, 1).unwrap();

        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].quantity, 3);
        assert_eq!(summary.total_price, dec!(30.00));
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let product = fixture.add_product("A-1", dec!(10.00));
        service.add_item(fixture.user_id, product, 2).unwrap();

        let summary = service
            .update_item_quantity(fixture.user_id, product, 5)
            .unwrap();
        assert_eq!(summary.total_items_count, 5);

        assert!(matches!(
            service.update_item_quantity(fixture.user_id, product, 0),
            Err(CommerceError::InvalidArgument(_))
        ));

        let summary = service.remove_item(fixture.user_id, product).unwrap();
        assert!(summary.is_empty);
        assert!(matches!(
            service.remove_item(fixture.user_id, product),
            Err(CommerceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let first = fixture.add_product("A-1", dec!(10.00));
        let second = fixture.add_product("B-1", dec!(5.00));
        service.add_item(fixture.user_id, first, 2).unwrap();
        service.add_item(fixture.user_id, second, 3).unwrap();

        let summary = service.clear(fixture.user_id).unwrap();
        assert!(summary.is_empty);
        assert_eq!(summary.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_zero_quantity_add_rejected() {
        let fixture = Fixture::new();
        let product = fixture.add_product("A-1", dec!(10.00));
        assert!(matches!(
            fixture.service().add_item(fixture.user_id, product, 0),
            Err(CommerceError::InvalidArgument(_))
        ));
    }
}
