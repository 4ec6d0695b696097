//! Status enums for the commerce entities.
//!
//! All statuses serialize as `SCREAMING_SNAKE_CASE` strings, which is also
//! the form used in API payloads and the order status-history log.

use serde::{Deserialize, Serialize};

/// Account lifecycle status.
///
/// New registrations start in `PendingVerification` and move to `Active`
/// once the email is verified. `Inactive` and `Suspended` are administrative
/// states; the lock flag is a separate axis tracked on the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    #[default]
    PendingVerification,
}

/// Product catalog status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    OutOfStock,
    Discontinued,
    PendingApproval,
}

/// Order lifecycle status.
///
/// The main line runs `Pending → Confirmed → Processing → Shipped →
/// Delivered`; `Cancelled`, `Returned` and `Refunded` are side branches.
/// The update operation does not restrict transitions beyond cancellation
/// eligibility; every change is recorded in the order's status history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
    Refunded,
}

/// Payment settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    BankTransfer,
    CashOnDelivery,
}

/// What an address may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressKind {
    Shipping,
    Billing,
    Both,
}

macro_rules! screaming_display {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let s = match self {
                    $(Self::$variant => $label),+
                };
                f.write_str(s)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($ty), ": {}"), s)),
                }
            }
        }
    };
}

screaming_display!(UserStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Suspended => "SUSPENDED",
    PendingVerification => "PENDING_VERIFICATION",
});

screaming_display!(ProductStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    OutOfStock => "OUT_OF_STOCK",
    Discontinued => "DISCONTINUED",
    PendingApproval => "PENDING_APPROVAL",
});

screaming_display!(OrderStatus {
    Pending => "PENDING",
    Confirmed => "CONFIRMED",
    Processing => "PROCESSING",
    Shipped => "SHIPPED",
    Delivered => "DELIVERED",
    Cancelled => "CANCELLED",
    Returned => "RETURNED",
    Refunded => "REFUNDED",
});

screaming_display!(PaymentStatus {
    Pending => "PENDING",
    Completed => "COMPLETED",
    Failed => "FAILED",
    Refunded => "REFUNDED",
    PartiallyRefunded => "PARTIALLY_REFUNDED",
});

screaming_display!(PaymentMethod {
    CreditCard => "CREDIT_CARD",
    DebitCard => "DEBIT_CARD",
    Paypal => "PAYPAL",
    BankTransfer => "BANK_TRANSFER",
    CashOnDelivery => "CASH_ON_DELIVERY",
});

screaming_display!(AddressKind {
    Shipping => "SHIPPING",
    Billing => "BILLING",
    Both => "BOTH",
});
