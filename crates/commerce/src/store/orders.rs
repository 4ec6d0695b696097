//! Order entity operations.
//!
//! Two invariants are enforced at the write path, not trusted from callers:
//! every item's `total_price` is recomputed as `quantity × unit_price` on
//! each persist, and the status history may only grow.

use chrono::Utc;

use quince_core::{OrderId, OrderStatus, UserId};

use crate::error::{CommerceError, Result};
use crate::models::{NewOrder, Order};

use super::{Sequences, State};

impl State {
    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user or either address does not exist and
    /// `Conflict` if the order number is taken.
    pub fn create_order(&mut self, new: NewOrder) -> Result<Order> {
        if !self.users.contains_key(&new.user_id) {
            return Err(CommerceError::not_found("user", new.user_id));
        }
        if !self.addresses.contains_key(&new.shipping_address_id) {
            return Err(CommerceError::not_found("address", new.shipping_address_id));
        }
        if !self.addresses.contains_key(&new.billing_address_id) {
            return Err(CommerceError::not_found("address", new.billing_address_id));
        }
        if self.order_number_index.contains_key(&new.order_number) {
            return Err(CommerceError::conflict(format!(
                "order number already exists: {}",
                new.order_number
            )));
        }

        let now = Utc::now();
        let id = OrderId::new(Sequences::next(&mut self.sequences.orders));
        let mut order = Order {
            id,
            order_number: new.order_number,
            user_id: new.user_id,
            status: new.status,
            subtotal: new.subtotal,
            tax_amount: new.tax_amount,
            shipping_amount: new.shipping_amount,
            discount_amount: new.discount_amount,
            total_amount: new.total_amount,
            items: new.items,
            shipping_address_id: new.shipping_address_id,
            billing_address_id: new.billing_address_id,
            payment_method: new.payment_method,
            payment_status: new.payment_status,
            payment_transaction_id: None,
            ordered_at: now,
            shipped_at: None,
            delivered_at: None,
            tracking_number: None,
            notes: new.notes,
            status_history: vec![new.initial_change],
            created_at: now,
            updated_at: now,
        };

        for item in &mut order.items {
            item.recompute_total_price();
        }

        self.order_number_index
            .insert(order.order_number.clone(), id);
        self.orders.insert(id, order.clone());

        Ok(order)
    }

    /// Look up an order by ID.
    #[must_use]
    pub fn find_order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).cloned()
    }

    /// Look up an order by ID, failing with `NotFound` when absent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no order has this ID.
    pub fn get_order(&self, id: OrderId) -> Result<Order> {
        self.find_order(id)
            .ok_or_else(|| CommerceError::not_found("order", id))
    }

    /// Look up an order by its order number.
    #[must_use]
    pub fn find_order_by_number(&self, order_number: &str) -> Option<Order> {
        let id = self.order_number_index.get(order_number)?;
        self.orders.get(id).cloned()
    }

    /// Whether an order number is taken.
    #[must_use]
    pub fn order_number_exists(&self, order_number: &str) -> bool {
        self.order_number_index.contains_key(order_number)
    }

    /// Persist an updated order.
    ///
    /// Recomputes item totals, refreshes `updated_at`, and rejects history
    /// truncation: the stored log is append-only.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist and `InvalidArgument`
    /// if the update would shrink the status history or change the order
    /// number.
    pub fn update_order(&mut self, mut order: Order) -> Result<Order> {
        let existing = self.get_order(order.id)?;

        if order.order_number != existing.order_number {
            return Err(CommerceError::invalid("order number cannot be changed"));
        }
        if order.status_history.len() < existing.status_history.len() {
            return Err(CommerceError::invalid("status history is append-only"));
        }

        for item in &mut order.items {
            item.recompute_total_price();
        }

        order.updated_at = Utc::now();
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    /// A user's orders, newest first.
    #[must_use]
    pub fn orders_for_user(&self, user_id: UserId) -> Vec<Order> {
        let mut orders: Vec<_> = self
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at).then(b.id.cmp(&a.id)));
        orders
    }

    /// Orders in a given status, newest first.
    #[must_use]
    pub fn orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
        let mut orders: Vec<_> = self
            .orders
            .values()
            .filter(|order| order.status == status)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at).then(b.id.cmp(&a.id)));
        orders
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal_macros::dec;

    use quince_core::{
        AddressId, AddressKind, Email, PaymentStatus, ProductId, Role, UserStatus,
    };

    use super::*;
    use crate::models::{NewAddress, NewUser, OrderItem, StatusChange};
    use crate::store::Store;

    fn seeded() -> (Store, UserId, AddressId) {
        let store = Store::new();
        let (user_id, address_id) = {
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
            let address = uow
                .create_address(NewAddress {
                    user_id: user.id,
                    kind: AddressKind::Both,
                    street_address: "12 Orchard Lane".to_owned(),
                    address_line2: None,
                    city: "Portland".to_owned(),
                    state: "OR".to_owned(),
                    postal_code: "97201".to_owned(),
                    country: "USA".to_owned(),
                    is_default: true,
                    first_name: None,
                    last_name: None,
                    phone_number: None,
                    company: None,
                })
                .unwrap();
            uow.commit();
            (user.id, address.id)
        };
        (store, user_id, address_id)
    }

    fn new_order(user_id: UserId, address_id: AddressId, number: &str) -> NewOrder {
        NewOrder {
            order_number: number.to_owned(),
            user_id,
            status: OrderStatus::Pending,
            subtotal: dec!(20.00),
            tax_amount: dec!(0.00),
            shipping_amount: dec!(0.00),
            discount_amount: dec!(0.00),
            total_amount: dec!(20.00),
            items: vec![OrderItem {
                product_id: ProductId::new(1),
                quantity: 2,
                unit_price: dec!(10.00),
                total_price: dec!(999.99), // wrong on purpose; write path fixes it
                product_name: "Walnut Desk".to_owned(),
                product_sku: "DESK-001".to_owned(),
                product_description: None,
            }],
            shipping_address_id: address_id,
            billing_address_id: address_id,
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            notes: None,
            initial_change: StatusChange {
                status: OrderStatus::Pending,
                notes: Some("Order placed".to_owned()),
                changed_by: "alice".to_owned(),
                changed_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_create_recomputes_item_totals() {
        let (store, user_id, address_id) = seeded();
        let mut uow = store.begin();
        let order = uow
            .create_order(new_order(user_id, address_id, "ORD-0001"))
            .unwrap();
        assert_eq!(order.items[0].total_price, dec!(20.00));
        assert_eq!(order.status_history.len(), 1);
    }

    #[test]
    fn test_update_recomputes_totals_after_quantity_change() {
        let (store, user_id, address_id) = seeded();
        let mut uow = store.begin();
        let mut order = uow
            .create_order(new_order(user_id, address_id, "ORD-0001"))
            .unwrap();

        order.items[0].quantity = 5;
        let order = uow.update_order(order).unwrap();
        assert_eq!(order.items[0].total_price, dec!(50.00));
        assert_eq!(order.total_items_count(), 5);
    }

    #[test]
    fn test_history_cannot_shrink() {
        let (store, user_id, address_id) = seeded();
        let mut uow = store.begin();
        let mut order = uow
            .create_order(new_order(user_id, address_id, "ORD-0001"))
            .unwrap();

        order.status_history.clear();
        assert!(matches!(
            uow.update_order(order),
            Err(CommerceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_order_number_unique() {
        let (store, user_id, address_id) = seeded();
        let mut uow = store.begin();
        uow.create_order(new_order(user_id, address_id, "ORD-0001"))
            .unwrap();
        assert!(matches!(
            uow.create_order(new_order(user_id, address_id, "ORD-0001")),
            Err(CommerceError::Conflict(_))
        ));
    }

    #[test]
    fn test_orders_for_user_newest_first() {
        let (store, user_id, address_id) = seeded();
        let mut uow = store.begin();
        uow.create_order(new_order(user_id, address_id, "ORD-0001"))
            .unwrap();
        uow.create_order(new_order(user_id, address_id, "ORD-0002"))
            .unwrap();

        let orders = uow.orders_for_user(user_id);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, "ORD-0002");
    }
}
