//! Order service: placement, lifecycle transitions and history.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;

use quince_core::{
    money, AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

use crate::error::{CommerceError, Result};
use crate::models::{NewOrder, Order, OrderItem, StatusChange};
use crate::page::{Page, PageRequest};
use crate::services::mailer::Mailer;
use crate::store::Store;

/// One requested line of a new order.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Order placement request.
///
/// Tax, shipping and discount are externally supplied amounts; the subtotal
/// is derived from the item snapshots and the grand total is
/// `subtotal + tax + shipping − discount`.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub items: Vec<OrderLine>,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub payment_method: Option<PaymentMethod>,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub notes: Option<String>,
}

/// Order operations.
pub struct OrderService<'a> {
    store: &'a Store,
    mailer: &'a dyn Mailer,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a Store, mailer: &'a dyn Mailer) -> Self {
        Self { store, mailer }
    }

    /// Place an order.
    ///
    /// Runs as one unit of work: every line performs the conditional stock
    /// decrement, so a failure on any line rolls back the decrements of the
    /// lines before it. Item snapshots capture product name, SKU,
    /// description and price at purchase time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty order, a zero quantity, an
    /// unavailable product, negative money inputs, or a discount exceeding
    /// the order total; `NotFound` for unknown user, address or product;
    /// `InsufficientStock` when a line cannot be covered.
    pub fn place_order(&self, user_id: UserId, request: PlaceOrder) -> Result<Order> {
        tracing::info!(user_id = %user_id, "placing order");

        if request.items.is_empty() {
            return Err(CommerceError::invalid("order must contain at least one item"));
        }
        for amount in [
            request.tax_amount,
            request.shipping_amount,
            request.discount_amount,
        ] {
            if !money::is_non_negative(amount) {
                return Err(CommerceError::invalid(
                    "tax, shipping and discount must be greater than or equal to 0",
                ));
            }
        }

        let mut uow = self.store.begin();
        let user = uow.get_user(user_id)?;

        for address_id in [request.shipping_address_id, request.billing_address_id] {
            let address = uow.get_address(address_id)?;
            if address.user_id != user_id {
                return Err(CommerceError::not_found("address", address_id));
            }
        }

        let mut items = Vec::with_capacity(request.items.len());
        let mut subtotal = Decimal::ZERO;
        for line in &request.items {
            if line.quantity == 0 {
                return Err(CommerceError::invalid("quantity must be at least 1"));
            }

            let product = uow.get_product(line.product_id)?;
            if !product.is_available() {
                return Err(CommerceError::invalid(format!(
                    "product {} is not available",
                    product.sku
                )));
            }

            let decremented = uow.decrement_stock(product.id, line.quantity)?;
            if !decremented {
                return Err(CommerceError::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.stock_quantity,
                });
            }
            uow.increment_sales_count(product.id, line.quantity)?;

            let mut item = OrderItem {
                product_id: product.id,
                quantity: line.quantity,
                unit_price: product.price,
                total_price: Decimal::ZERO,
                product_name: product.name,
                product_sku: product.sku,
                product_description: product.description,
            };
            item.recompute_total_price();
            subtotal += item.total_price;
            items.push(item);
        }

        let subtotal = money::normalize(subtotal);
        let total = money::normalize(
            subtotal + request.tax_amount + request.shipping_amount - request.discount_amount,
        );
        if total < Decimal::ZERO {
            return Err(CommerceError::invalid("discount exceeds order total"));
        }

        let order_number = loop {
            let candidate = generate_order_number();
            if !uow.order_number_exists(&candidate) {
                break candidate;
            }
        };

        let order = uow.create_order(NewOrder {
            order_number,
            user_id,
            status: OrderStatus::Pending,
            subtotal,
            tax_amount: money::normalize(request.tax_amount),
            shipping_amount: money::normalize(request.shipping_amount),
            discount_amount: money::normalize(request.discount_amount),
            total_amount: total,
            items,
            shipping_address_id: request.shipping_address_id,
            billing_address_id: request.billing_address_id,
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            notes: request.notes,
            initial_change: StatusChange {
                status: OrderStatus::Pending,
                notes: Some("Order placed".to_owned()),
                changed_by: user.username.clone(),
                changed_at: Utc::now(),
            },
        })?;
        uow.commit();

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            "order placed successfully"
        );
        self.mailer.send_order_confirmation(&user, &order.order_number);

        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub fn get_order(&self, id: OrderId) -> Result<Order> {
        self.store.snapshot().get_order(id)
    }

    /// Get an order by order number.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub fn get_order_by_number(&self, order_number: &str) -> Result<Order> {
        self.store
            .snapshot()
            .find_order_by_number(order_number)
            .ok_or_else(|| CommerceError::not_found("order", order_number))
    }

    /// A user's orders, newest first, paginated.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn list_user_orders(&self, user_id: UserId, page: PageRequest) -> Result<Page<Order>> {
        let snapshot = self.store.snapshot();
        snapshot.get_user(user_id)?;
        Ok(Page::from_vec(snapshot.orders_for_user(user_id), page))
    }

    /// Orders in a given status, newest first, paginated.
    #[must_use]
    pub fn list_orders_by_status(&self, status: OrderStatus, page: PageRequest) -> Page<Order> {
        Page::from_vec(self.store.snapshot().orders_by_status(status), page)
    }

    /// Set an order's status.
    ///
    /// Transitions are not restricted (the update is permissive by design);
    /// entering `SHIPPED` or `DELIVERED` stamps the matching timestamp, and
    /// every change appends one entry to the append-only status history.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        notes: Option<String>,
        changed_by: &str,
    ) -> Result<Order> {
        tracing::info!(order_id = %id, status = %status, "updating order status");

        let mut uow = self.store.begin();
        let order = uow.get_order(id)?;
        let order = Self::apply_status(order, status, notes, changed_by);
        let order = uow.update_order(order)?;
        uow.commit();
        Ok(order)
    }

    /// Cancel an order.
    ///
    /// Only `PENDING` and `CONFIRMED` orders are eligible. Stock is not
    /// returned; restocking is a separate fulfillment concern.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, `InvalidArgument`
    /// if the order is past the cancellable states.
    pub fn cancel_order(
        &self,
        id: OrderId,
        notes: Option<String>,
        changed_by: &str,
    ) -> Result<Order> {
        let mut uow = self.store.begin();
        let order = uow.get_order(id)?;

        if !order.can_be_cancelled() {
            return Err(CommerceError::invalid(format!(
                "order {} cannot be cancelled in status {}",
                order.order_number, order.status
            )));
        }

        tracing::info!(order_id = %id, "cancelling order");
        let order = Self::apply_status(order, OrderStatus::Cancelled, notes, changed_by);
        let order = uow.update_order(order)?;
        uow.commit();
        Ok(order)
    }

    /// Set the payment status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub fn set_payment_status(&self, id: OrderId, status: PaymentStatus) -> Result<Order> {
        let mut uow = self.store.begin();
        let mut order = uow.get_order(id)?;
        order.payment_status = status;
        let order = uow.update_order(order)?;
        uow.commit();
        Ok(order)
    }

    fn apply_status(
        mut order: Order,
        status: OrderStatus,
        notes: Option<String>,
        changed_by: &str,
    ) -> Order {
        let now = Utc::now();
        order.status = status;
        match status {
            OrderStatus::Shipped if order.shipped_at.is_none() => order.shipped_at = Some(now),
            OrderStatus::Delivered if order.delivered_at.is_none() => {
                order.delivered_at = Some(now);
            }
            _ => {}
        }
        order.status_history.push(StatusChange {
            status,
            notes,
            changed_by: changed_by.to_owned(),
            changed_at: now,
        });
        order
    }
}

/// Generate an order number: `ORD-` plus ten uppercase alphanumerics.
fn generate_order_number() -> String {
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(10)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("ORD-{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal_macros::dec;

    use quince_core::{AddressId, AddressKind, Email, ProductStatus, Role, UserStatus};

    use super::*;
    use crate::models::{NewAddress, NewCategory, NewProduct, NewUser, User};

    #[derive(Default)]
    struct CountingMailer {
        confirmations: AtomicUsize,
    }

    impl Mailer for CountingMailer {
        fn send_verification_email(&self, _user: &User) {}

        fn send_order_confirmation(&self, _user: &User, _order_number: &str) {
            self.confirmations.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        store: Store,
        mailer: CountingMailer,
        user_id: UserId,
        address_id: AddressId,
    }

    impl Fixture {
        fn new() -> Self {
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
                uow.create_cart(user.id).unwrap();
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

            Self {
                store,
                mailer: CountingMailer::default(),
                user_id,
                address_id,
            }
        }

        fn service(&self) -> OrderService<'_> {
            OrderService::new(&self.store, &self.mailer)
        }

        fn add_product(&self, sku: &str, price: Decimal, stock: u32) -> ProductId {
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
                    name: format!("Product {sku}"),
                    description: None,
                    sku: sku.to_owned(),
                    price,
                    cost: None,
                    stock_quantity: stock,
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

        fn place(&self, lines: Vec<OrderLine>) -> Result<Order> {
            self.service().place_order(
                self.user_id,
                PlaceOrder {
                    items: lines,
                    shipping_address_id: self.address_id,
                    billing_address_id: self.address_id,
                    payment_method: Some(PaymentMethod::CreditCard),
                    tax_amount: dec!(0.00),
                    shipping_amount: dec!(0.00),
                    discount_amount: dec!(0.00),
                    notes: None,
                },
            )
        }
    }

    fn stock_of(fixture: &Fixture, id: ProductId) -> u32 {
        fixture.store.snapshot().get_product(id).unwrap().stock_quantity
    }

    #[test]
    fn test_place_order_decrements_stock_and_snapshots_items() {
        let fixture = Fixture::new();
        let product_id = fixture.add_product("DESK-001", dec!(10.00), 5);

        let order = fixture
            .place(vec![OrderLine {
                product_id,
                quantity: 2,
            }])
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal, dec!(20.00));
        assert_eq!(order.total_amount, dec!(20.00));
        assert_eq!(order.total_items_count(), 2);
        assert_eq!(order.items[0].product_sku, "DESK-001");
        assert_eq!(order.items[0].total_price, dec!(20.00));
        assert_eq!(order.status_history.len(), 1);
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(stock_of(&fixture, product_id), 3);
        assert_eq!(fixture.mailer.confirmations.load(Ordering::SeqCst), 1);

        // Sales counter followed the purchase.
        let product = fixture.store.snapshot().get_product(product_id).unwrap();
        assert_eq!(product.sales_count, 2);
    }

    #[test]
    fn test_insufficient_stock_fails_and_changes_nothing() {
        let fixture = Fixture::new();
        let product_id = fixture.add_product("DESK-001", dec!(10.00), 3);

        let err = fixture
            .place(vec![OrderLine {
                product_id,
                quantity: 5,
            }])
            .unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InsufficientStock {
                requested: 5,
                available: 3,
                ..
            }
        ));
        assert_eq!(stock_of(&fixture, product_id), 3);
        assert_eq!(fixture.mailer.confirmations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_multi_line_failure_rolls_back_earlier_decrements() {
        let fixture = Fixture::new();
        let first = fixture.add_product("DESK-001", dec!(10.00), 5);
        let second = fixture.add_product("CHAIR-001", dec!(5.00), 1);

        let err = fixture
            .place(vec![
                OrderLine {
                    product_id: first,
                    quantity: 2,
                },
                OrderLine {
                    product_id: second,
                    quantity: 3,
                },
            ])
            .unwrap_err();
        assert!(matches!(err, CommerceError::InsufficientStock { .. }));

        // The first line's decrement was rolled back with the unit of work.
        assert_eq!(stock_of(&fixture, first), 5);
        assert_eq!(stock_of(&fixture, second), 1);
    }

    #[test]
    fn test_exact_stock_drains_to_zero() {
        let fixture = Fixture::new();
        let product_id = fixture.add_product("DESK-001", dec!(10.00), 3);

        fixture
            .place(vec![OrderLine {
                product_id,
                quantity: 3,
            }])
            .unwrap();
        let product = fixture.store.snapshot().get_product(product_id).unwrap();
        assert_eq!(product.stock_quantity, 0);
        assert!(!product.is_available());
    }

    #[test]
    fn test_totals_combine_supplied_amounts() {
        let fixture = Fixture::new();
        let product_id = fixture.add_product("DESK-001", dec!(100.00), 10);

        let order = fixture
            .service()
            .place_order(
                fixture.user_id,
                PlaceOrder {
                    items: vec![OrderLine {
                        product_id,
                        quantity: 1,
                    }],
                    shipping_address_id: fixture.address_id,
                    billing_address_id: fixture.address_id,
                    payment_method: None,
                    tax_amount: dec!(8.25),
                    shipping_amount: dec!(12.00),
                    discount_amount: dec!(20.00),
                    notes: None,
                },
            )
            .unwrap();
        assert_eq!(order.subtotal, dec!(100.00));
        assert_eq!(order.total_amount, dec!(100.25));
    }

    #[test]
    fn test_empty_order_rejected() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture.place(Vec::new()),
            Err(CommerceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_status_updates_append_history_and_stamp_timestamps() {
        let fixture = Fixture::new();
        let product_id = fixture.add_product("DESK-001", dec!(10.00), 5);
        let order = fixture
            .place(vec![OrderLine {
                product_id,
                quantity: 1,
            }])
            .unwrap();
        let service = fixture.service();

        let order = service
            .update_status(order.id, OrderStatus::Confirmed, None, "ops")
            .unwrap();
        let order = service
            .update_status(order.id, OrderStatus::Shipped, Some("FedEx".to_owned()), "ops")
            .unwrap();
        assert!(order.shipped_at.is_some());

        let order = service
            .update_status(order.id, OrderStatus::Delivered, None, "ops")
            .unwrap();
        assert!(order.delivered_at.is_some());
        assert!(order.is_completed());

        // Placement + three changes.
        assert_eq!(order.status_history.len(), 4);
        assert_eq!(order.status_history[2].status, OrderStatus::Shipped);
        assert_eq!(order.status_history[2].changed_by, "ops");
    }

    #[test]
    fn test_cancellation_eligibility() {
        let fixture = Fixture::new();
        let product_id = fixture.add_product("DESK-001", dec!(10.00), 5);
        let service = fixture.service();

        let order = fixture
            .place(vec![OrderLine {
                product_id,
                quantity: 1,
            }])
            .unwrap();
        assert!(order.can_be_cancelled());

        let shipped = service
            .update_status(order.id, OrderStatus::Shipped, None, "ops")
            .unwrap();
        assert!(!shipped.can_be_cancelled());
        let err = service.cancel_order(order.id, None, "alice").unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));

        // A fresh pending order cancels fine and logs the change.
        let order = fixture
            .place(vec![OrderLine {
                product_id,
                quantity: 1,
            }])
            .unwrap();
        let cancelled = service
            .cancel_order(order.id, Some("changed my mind".to_owned()), "alice")
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.status_history.len(), 2);
    }

    #[test]
    fn test_unknown_address_rejected() {
        let fixture = Fixture::new();
        let product_id = fixture.add_product("DESK-001", dec!(10.00), 5);

        let err = fixture
            .service()
            .place_order(
                fixture.user_id,
                PlaceOrder {
                    items: vec![OrderLine {
                        product_id,
                        quantity: 1,
                    }],
                    shipping_address_id: AddressId::new(99),
                    billing_address_id: fixture.address_id,
                    payment_method: None,
                    tax_amount: dec!(0.00),
                    shipping_amount: dec!(0.00),
                    discount_amount: dec!(0.00),
                    notes: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
        assert_eq!(stock_of(&fixture, product_id), 5);
    }
}
