//! Checkout flow: catalog, cart, order placement and lifecycle.

#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use secrecy::SecretString;

use quince_commerce::services::{
    AccountService, CartService, CatalogService, CreateCategory, CreateProduct, OrderLine,
    OrderService, PlaceOrder, RegisterAccount,
};
use quince_commerce::{CommerceConfig, CommerceError, Store};
use quince_core::{AddressKind, Email, OrderStatus, PaymentMethod, ProductId, UserId};
use quince_integration_tests::CountingMailer;

struct World {
    store: Store,
    config: CommerceConfig,
    mailer: CountingMailer,
}

impl World {
    fn new() -> Self {
        Self {
            store: Store::new(),
            config: CommerceConfig::default(),
            mailer: CountingMailer::default(),
        }
    }

    fn accounts(&self) -> AccountService<'_> {
        AccountService::new(&self.store, &self.config, &self.mailer)
    }

    fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(&self.store, &self.config)
    }

    fn orders(&self) -> OrderService<'_> {
        OrderService::new(&self.store, &self.mailer)
    }

    fn carts(&self) -> CartService<'_> {
        CartService::new(&self.store)
    }

    fn shopper(&self) -> (UserId, quince_core::AddressId) {
        let accounts = self.accounts();
        let user = accounts
            .register(RegisterAccount {
                username: "alice".to_owned(),
                email: Email::parse("alice@x.com").unwrap(),
                password: SecretString::from("a sturdy passphrase"),
                first_name: "Alice".to_owned(),
                last_name: "Archer".to_owned(),
                phone_number: None,
            })
            .unwrap();
        accounts.verify_email(user.id).unwrap();
        let address = accounts
            .add_address(quince_commerce::models::NewAddress {
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
        (user.id, address.id)
    }

    fn product(&self, sku: &str, price: rust_decimal::Decimal, stock: u32) -> ProductId {
        let catalog = self.catalog();
        let category = match catalog.get_category_by_slug("all") {
            Ok(category) => category,
            Err(_) => catalog
                .create_category(CreateCategory {
                    name: "All".to_owned(),
                    description: None,
                    slug: "all".to_owned(),
                    image_url: None,
                    sort_order: None,
                    parent_id: None,
                })
                .unwrap(),
        };
        catalog
            .create_product(CreateProduct {
                name: format!("Product {sku}"),
                description: None,
                sku: sku.to_owned(),
                price,
                cost: None,
                stock_quantity: stock,
                minimum_stock_level: None,
                active: None,
                featured: None,
                status: None,
                weight: None,
                weight_unit: None,
                dimensions: None,
                brand: None,
                model: None,
                color: None,
                size: None,
                category_id: category.id,
                images: Vec::new(),
            })
            .unwrap()
            .id
    }
}

#[test]
fn checkout_end_to_end() {
    let world = World::new();
    let (user_id, address_id) = world.shopper();
    let desk = world.product("DESK-001", dec!(10.00), 5);
    let lamp = world.product("LAMP-001", dec!(5.00), 10);

    // Cart totals derive from lines and prices.
    let carts = world.carts();
    carts.add_item(user_id, desk, 2).unwrap();
    let summary = carts.add_item(user_id, lamp, 3).unwrap();
    assert_eq!(summary.total_items_count, 5);
    assert_eq!(summary.total_price, dec!(35.00));

    // Place the order from the cart's contents.
    let orders = world.orders();
    let order = orders
        .place_order(
            user_id,
            PlaceOrder {
                items: vec![
                    OrderLine {
                        product_id: desk,
                        quantity: 2,
                    },
                    OrderLine {
                        product_id: lamp,
                        quantity: 3,
                    },
                ],
                shipping_address_id: address_id,
                billing_address_id: address_id,
                payment_method: Some(PaymentMethod::CreditCard),
                tax_amount: dec!(2.80),
                shipping_amount: dec!(5.00),
                discount_amount: dec!(0.00),
                notes: None,
            },
        )
        .unwrap();
    assert_eq!(order.subtotal, dec!(35.00));
    assert_eq!(order.total_amount, dec!(42.80));
    assert_eq!(order.total_items_count(), 5);
    assert_eq!(world.mailer.confirmation_count(), 1);

    // Stock followed the purchase.
    let snapshot = world.store.snapshot();
    assert_eq!(snapshot.get_product(desk).unwrap().stock_quantity, 3);
    assert_eq!(snapshot.get_product(lamp).unwrap().stock_quantity, 7);
    drop(snapshot);

    carts.clear(user_id).unwrap();
    assert!(carts.get_cart(user_id).unwrap().is_empty);

    // Lifecycle: history grows by one entry per change.
    let order = orders
        .update_status(order.id, OrderStatus::Confirmed, None, "ops")
        .unwrap();
    let order = orders
        .update_status(order.id, OrderStatus::Shipped, None, "ops")
        .unwrap();
    assert!(order.shipped_at.is_some());
    assert!(!order.can_be_cancelled());
    assert!(matches!(
        orders.cancel_order(order.id, None, "alice"),
        Err(CommerceError::InvalidArgument(_))
    ));

    let order = orders
        .update_status(order.id, OrderStatus::Delivered, None, "ops")
        .unwrap();
    assert!(order.is_completed());
    assert_eq!(order.status_history.len(), 4);
    let statuses: Vec<_> = order
        .status_history
        .iter()
        .map(|change| change.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ]
    );

    // A delivered order makes the shopper's review a verified purchase.
    let review = world
        .catalog()
        .add_review(
            desk,
            quince_commerce::services::CreateReview {
                user_id,
                rating: 5,
                title: Some("Great desk".to_owned()),
                comment: None,
            },
        )
        .unwrap();
    assert!(review.verified);
}

#[test]
fn insufficient_stock_rolls_back_the_whole_order() {
    let world = World::new();
    let (user_id, address_id) = world.shopper();
    let plentiful = world.product("DESK-001", dec!(10.00), 5);
    let scarce = world.product("LAMP-001", dec!(5.00), 1);

    let err = world
        .orders()
        .place_order(
            user_id,
            PlaceOrder {
                items: vec![
                    OrderLine {
                        product_id: plentiful,
                        quantity: 2,
                    },
                    OrderLine {
                        product_id: scarce,
                        quantity: 2,
                    },
                ],
                shipping_address_id: address_id,
                billing_address_id: address_id,
                payment_method: None,
                tax_amount: dec!(0.00),
                shipping_amount: dec!(0.00),
                discount_amount: dec!(0.00),
                notes: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, CommerceError::InsufficientStock { .. }));

    // Neither decrement survived, no order exists, no email went out.
    let snapshot = world.store.snapshot();
    assert_eq!(snapshot.get_product(plentiful).unwrap().stock_quantity, 5);
    assert_eq!(snapshot.get_product(scarce).unwrap().stock_quantity, 1);
    assert!(snapshot.orders_for_user(user_id).is_empty());
    assert_eq!(world.mailer.confirmation_count(), 0);
}

#[test]
fn draining_stock_makes_the_product_unavailable() {
    let world = World::new();
    let (user_id, address_id) = world.shopper();
    let product = world.product("DESK-001", dec!(10.00), 3);

    world
        .orders()
        .place_order(
            user_id,
            PlaceOrder {
                items: vec![OrderLine {
                    product_id: product,
                    quantity: 3,
                }],
                shipping_address_id: address_id,
                billing_address_id: address_id,
                payment_method: None,
                tax_amount: dec!(0.00),
                shipping_amount: dec!(0.00),
                discount_amount: dec!(0.00),
                notes: None,
            },
        )
        .unwrap();

    let stored = world.store.snapshot().get_product(product).unwrap();
    assert_eq!(stored.stock_quantity, 0);
    assert!(!stored.is_available());
    assert!(stored.is_low_stock());

    // A drained product can no longer be ordered.
    assert!(matches!(
        world.orders().place_order(
            user_id,
            PlaceOrder {
                items: vec![OrderLine {
                    product_id: product,
                    quantity: 1,
                }],
                shipping_address_id: address_id,
                billing_address_id: address_id,
                payment_method: None,
                tax_amount: dec!(0.00),
                shipping_amount: dec!(0.00),
                discount_amount: dec!(0.00),
                notes: None,
            },
        ),
        Err(CommerceError::InvalidArgument(_))
    ));
}
