//! Money helpers for 2-decimal fixed-point amounts.
//!
//! All monetary fields in the system (prices, costs, order totals) are
//! `rust_decimal::Decimal` values normalized to two decimal places. These
//! helpers centralize the normalization and sign checks so that entities and
//! services agree on what a valid amount looks like.

use rust_decimal::Decimal;

/// Number of decimal places carried by every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Normalize an amount to two decimal places (bankers' rounding).
#[must_use]
pub fn normalize(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}

/// Whether the amount is a valid non-negative monetary value.
#[must_use]
pub fn is_non_negative(amount: Decimal) -> bool {
    amount >= Decimal::ZERO
}

/// Whether the amount is a valid strictly-positive monetary value
/// (e.g. a product price or an order item unit price).
#[must_use]
pub fn is_positive(amount: Decimal) -> bool {
    amount > Decimal::ZERO
}

/// Multiply a unit amount by an integer quantity, normalized to money scale.
///
/// This is the one derivation rule shared by order items and cart lines:
/// `total = quantity × unit`.
#[must_use]
pub fn line_total(unit: Decimal, quantity: u32) -> Decimal {
    normalize(unit * Decimal::from(quantity))
}
