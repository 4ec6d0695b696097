//! Order, order item and status-history records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use quince_core::{
    money, AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

/// A customer order.
///
/// Money fields are set by the placement orchestration and stored; they are
/// not re-derived afterwards. The status history is an append-only audit
/// log: entries are only ever added, never changed or removed.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Unique human-facing order number.
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    /// Immutable snapshot of what was bought, at purchase-time prices.
    pub items: Vec<OrderItem>,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub payment_transaction_id: Option<String>,
    pub ordered_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    /// Append-only log of status changes.
    pub status_history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether the order may still be cancelled.
    #[must_use]
    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Whether the order reached its terminal success state.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Delivered
    }

    /// Sum of item quantities.
    #[must_use]
    pub fn total_items_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A line within an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Price per unit at purchase time.
    pub unit_price: Decimal,
    /// `quantity × unit_price`; recomputed on every persist, never trusted
    /// across mutations.
    pub total_price: Decimal,
    /// Product name at purchase time.
    pub product_name: String,
    /// Product SKU at purchase time.
    pub product_sku: String,
    pub product_description: Option<String>,
}

impl OrderItem {
    /// Recompute `total_price` from quantity and unit price.
    pub fn recompute_total_price(&mut self) {
        self.total_price = money::line_total(self.unit_price, self.quantity);
    }
}

/// One entry in an order's status history.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Identity that made the change.
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

/// Fields for creating an order; the store assigns ID and timestamps and
/// recomputes item totals on write.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub items: Vec<OrderItem>,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    /// Initial history entry (normally the `PENDING` placement record).
    pub initial_change: StatusChange,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: u32, unit_price: Decimal) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(1),
            quantity,
            unit_price,
            total_price: Decimal::ZERO,
            product_name: "Walnut Desk".to_owned(),
            product_sku: "DESK-001".to_owned(),
            product_description: None,
        }
    }

    fn sample_order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(1),
            order_number: "ORD-TEST0001".to_owned(),
            user_id: UserId::new(1),
            status,
            subtotal: dec!(35.00),
            tax_amount: dec!(0.00),
            shipping_amount: dec!(0.00),
            discount_amount: dec!(0.00),
            total_amount: dec!(35.00),
            items: vec![line(2, dec!(10.00)), line(3, dec!(5.00))],
            shipping_address_id: AddressId::new(1),
            billing_address_id: AddressId::new(1),
            payment_method: Some(PaymentMethod::CreditCard),
            payment_status: PaymentStatus::Pending,
            payment_transaction_id: None,
            ordered_at: now,
            shipped_at: None,
            delivered_at: None,
            tracking_number: None,
            notes: None,
            status_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cancellation_eligibility() {
        assert!(sample_order(OrderStatus::Pending).can_be_cancelled());
        assert!(sample_order(OrderStatus::Confirmed).can_be_cancelled());
        assert!(!sample_order(OrderStatus::Shipped).can_be_cancelled());
        assert!(!sample_order(OrderStatus::Delivered).can_be_cancelled());
        assert!(!sample_order(OrderStatus::Cancelled).can_be_cancelled());
    }

    #[test]
    fn test_completion() {
        assert!(sample_order(OrderStatus::Delivered).is_completed());
        assert!(!sample_order(OrderStatus::Shipped).is_completed());
    }

    #[test]
    fn test_total_items_count_tracks_quantities() {
        let mut order = sample_order(OrderStatus::Pending);
        assert_eq!(order.total_items_count(), 5);

        order.items[0].quantity = 7;
        assert_eq!(order.total_items_count(), 10);
    }

    #[test]
    fn test_recompute_total_price() {
        let mut item = line(3, dec!(19.99));
        item.recompute_total_price();
        assert_eq!(item.total_price, dec!(59.97));

        item.quantity = 1;
        item.recompute_total_price();
        assert_eq!(item.total_price, dec!(19.99));
    }
}
