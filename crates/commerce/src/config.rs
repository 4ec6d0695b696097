//! Commerce configuration.
//!
//! Thresholds that govern the account security and inventory rules. They are
//! an explicit structure handed to the services rather than constants, so
//! tests and deployments can vary them.

/// Tunable thresholds for the commerce services.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Consecutive failed login attempts after which an account is locked.
    pub lockout_threshold: u32,
    /// `minimum_stock_level` assigned to products created without one.
    pub default_minimum_stock_level: u32,
    /// Minimum accepted password length for registration and changes.
    pub min_password_length: usize,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            lockout_threshold: 5,
            default_minimum_stock_level: 10,
            min_password_length: 8,
        }
    }
}
