//! Domain error taxonomy.
//!
//! Every failure a commerce operation can produce. Errors are raised at the
//! point of detection and surfaced unmodified to the boundary layer, which
//! maps each kind to an external status and payload. Nothing is retried.

use quince_core::ProductId;
use thiserror::Error;

/// Errors raised by the commerce services and store.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// An entity was looked up by ID or natural key and is absent.
    #[error("{resource} not found: {key}")]
    NotFound {
        /// Entity kind, e.g. `"user"` or `"product"`.
        resource: &'static str,
        /// The key that failed to resolve.
        key: String,
    },

    /// A unique key (username, email, SKU, slug, order number) is taken.
    #[error("{0}")]
    Conflict(String),

    /// A semantic rule was violated (wrong current password, mismatched
    /// confirmation, non-positive quantity, ineligible cancellation, ...).
    #[error("{0}")]
    InvalidArgument(String),

    /// A conditional stock decrement did not apply.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Authentication failed: unknown identifier or wrong password.
    ///
    /// Deliberately indistinguishable from the outside.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authentication refused: the account is locked.
    #[error("account is locked")]
    AccountLocked,

    /// Authentication refused: the account is disabled, suspended or not
    /// yet verified.
    #[error("account is disabled")]
    AccountDisabled,

    /// Password hashing failed; carries no detail by design of the hasher.
    #[error("password hashing failed")]
    PasswordHash,
}

impl CommerceError {
    /// Shorthand for a [`CommerceError::NotFound`].
    #[must_use]
    pub fn not_found(resource: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            resource,
            key: key.to_string(),
        }
    }

    /// Shorthand for a [`CommerceError::Conflict`].
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Shorthand for a [`CommerceError::InvalidArgument`].
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type alias for commerce operations.
pub type Result<T> = std::result::Result<T, CommerceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CommerceError::not_found("user", 42);
        assert_eq!(err.to_string(), "user not found: 42");

        let err = CommerceError::InsufficientStock {
            product_id: ProductId::new(1),
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product 1: requested 5, available 3"
        );
    }
}
