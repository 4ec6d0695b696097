//! Scripted checkout walkthrough.
//!
//! Exercises the domain end to end against an in-process store: seed the
//! catalog, register and verify a shopper, fill the cart, place an order,
//! walk the order through its lifecycle, and demonstrate the lockout rule.

use rust_decimal_macros::dec;
use secrecy::SecretString;

use quince_commerce::services::{
    AccountService, CartService, LogMailer, OrderLine, OrderService, PlaceOrder, RegisterAccount,
};
use quince_commerce::{CommerceConfig, Store};
use quince_core::{AddressKind, Email, OrderStatus, PaymentMethod};

use super::seed;

/// Run the walkthrough.
///
/// # Errors
///
/// Returns the first commerce error encountered; a clean run ends with a
/// cancelled-after-shipping rejection being demonstrated, not raised.
pub fn run(lockout_threshold: u32) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new();
    let config = CommerceConfig {
        lockout_threshold,
        ..CommerceConfig::default()
    };
    let mailer = LogMailer;

    seed::seed(&store, &config)?;

    let accounts = AccountService::new(&store, &config, &mailer);
    let carts = CartService::new(&store);
    let orders = OrderService::new(&store, &mailer);

    // Register and activate a shopper.
    let shopper = accounts.register(RegisterAccount {
        username: "alice".to_owned(),
        email: Email::parse("alice@example.com")?,
        password: SecretString::from("a sturdy passphrase"),
        first_name: "Alice".to_owned(),
        last_name: "Archer".to_owned(),
        phone_number: None,
    })?;
    accounts.verify_email(shopper.id)?;
    tracing::info!(username = %shopper.username, "shopper registered and verified");

    let address = accounts.add_address(quince_commerce::models::NewAddress {
        user_id: shopper.id,
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
    })?;

    // Fill the cart and show the derived totals.
    let snapshot = store.snapshot();
    let desk = snapshot
        .find_product_by_sku("DESK-001")
        .ok_or("seed data missing DESK-001")?;
    let lamp = snapshot
        .find_product_by_sku("LAMP-001")
        .ok_or("seed data missing LAMP-001")?;
    drop(snapshot);

    carts.add_item(shopper.id, desk.id, 1)?;
    let summary = carts.add_item(shopper.id, lamp.id, 2)?;
    tracing::info!(
        items = summary.total_items_count,
        total = %summary.total_price,
        "cart filled"
    );

    // Place the order and walk it to delivery.
    let order = orders.place_order(
        shopper.id,
        PlaceOrder {
            items: vec![
                OrderLine {
                    product_id: desk.id,
                    quantity: 1,
                },
                OrderLine {
                    product_id: lamp.id,
                    quantity: 2,
                },
            ],
            shipping_address_id: address.id,
            billing_address_id: address.id,
            payment_method: Some(PaymentMethod::CreditCard),
            tax_amount: dec!(38.16),
            shipping_amount: dec!(15.00),
            discount_amount: dec!(0.00),
            notes: None,
        },
    )?;
    carts.clear(shopper.id)?;
    tracing::info!(
        order_number = %order.order_number,
        total = %order.total_amount,
        "order placed"
    );

    let order = orders.update_status(order.id, OrderStatus::Confirmed, None, "ops")?;
    let order = orders.update_status(order.id, OrderStatus::Shipped, None, "ops")?;
    let order = orders.update_status(order.id, OrderStatus::Delivered, None, "ops")?;
    tracing::info!(
        status = %order.status,
        history_entries = order.status_history.len(),
        "order delivered"
    );

    // Cancellation after shipping is refused.
    if let Err(err) = orders.cancel_order(order.id, None, "alice") {
        tracing::info!(%err, "late cancellation correctly refused");
    }

    // Repeated failed logins lock the account.
    for _ in 0..lockout_threshold {
        accounts.record_failed_login("alice");
    }
    let locked = accounts.get_user(shopper.id)?;
    tracing::info!(
        attempts = locked.failed_login_attempts,
        locked = !locked.is_account_non_locked(chrono::Utc::now()),
        "lockout threshold reached"
    );
    accounts.set_locked(shopper.id, false)?;
    tracing::info!("account unlocked, walkthrough complete");

    Ok(())
}
