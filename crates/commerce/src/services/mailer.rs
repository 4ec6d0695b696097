//! Outbound email side effects.
//!
//! Delivery is an external collaborator; the domain only decides *when* a
//! message is owed. Services call the trait after their unit of work
//! commits, so a rolled-back operation never sends mail.

use crate::models::User;

/// Email side effects triggered by commerce operations.
pub trait Mailer: Send + Sync {
    /// Ask the user to verify their email address (sent once per
    /// registration).
    fn send_verification_email(&self, user: &User);

    /// Confirm a placed order.
    fn send_order_confirmation(&self, user: &User, order_number: &str);
}

/// Mailer that records the side effect in the log stream.
///
/// Stands in for the real delivery collaborator in development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_verification_email(&self, user: &User) {
        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            "verification email queued"
        );
    }

    fn send_order_confirmation(&self, user: &User, order_number: &str) {
        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            order_number,
            "order confirmation email queued"
        );
    }
}
