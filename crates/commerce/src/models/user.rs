//! User account record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use quince_core::{Email, Role, UserId, UserStatus};

/// A user account.
///
/// Sign-in eligibility combines three axes: the `enabled` flag, the
/// lifecycle [`UserStatus`], and the lock state (`account_non_locked` plus
/// an optional lockout timestamp). The failed-attempt counter drives
/// automatic lockout; the thresholds live in the commerce configuration.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: Email,
    /// One-way password hash (PHC string). Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub enabled: bool,
    pub account_non_expired: bool,
    pub account_non_locked: bool,
    pub credentials_non_expired: bool,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Consecutive failed login attempts since the last success.
    pub failed_login_attempts: u32,
    /// When the account was locked, if it was.
    pub lockout_time: Option<DateTime<Utc>>,
    pub status: UserStatus,
    /// Roles held by this account; replaced wholesale by role updates.
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account is currently non-locked.
    ///
    /// Locked means the lock flag is cleared or a lockout timestamp exists
    /// that has not yet passed.
    #[must_use]
    pub fn is_account_non_locked(&self, now: DateTime<Utc>) -> bool {
        self.account_non_locked && self.lockout_time.is_none_or(|t| t < now)
    }

    /// Effective sign-in eligibility: enabled, `Active`, and non-locked.
    #[must_use]
    pub fn is_sign_in_allowed(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.status == UserStatus::Active && self.is_account_non_locked(now)
    }

    /// Authority labels derived from the role set.
    #[must_use]
    pub fn authorities(&self) -> Vec<&'static str> {
        self.roles.iter().map(|role| role.authority()).collect()
    }

    /// Display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields for creating a user; the store assigns ID and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub enabled: bool,
    pub email_verified: bool,
    pub status: UserStatus,
    pub roles: BTreeSet<Role>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            username: "alice".to_owned(),
            email: Email::parse("alice@example.com").unwrap(),
            password_hash: "$argon2id$stub".to_owned(),
            first_name: "Alice".to_owned(),
            last_name: "Archer".to_owned(),
            phone_number: None,
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
            email_verified: true,
            last_login_at: None,
            failed_login_attempts: 0,
            lockout_time: None,
            status: UserStatus::Active,
            roles: BTreeSet::from([Role::User]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sign_in_allowed_when_active_and_unlocked() {
        let user = sample_user();
        assert!(user.is_sign_in_allowed(Utc::now()));
    }

    #[test]
    fn test_lockout_in_future_blocks_sign_in() {
        let now = Utc::now();
        let mut user = sample_user();
        user.account_non_locked = false;
        user.lockout_time = Some(now + Duration::minutes(30));
        assert!(!user.is_account_non_locked(now));
        assert!(!user.is_sign_in_allowed(now));
    }

    #[test]
    fn test_expired_lockout_readmits() {
        let now = Utc::now();
        let mut user = sample_user();
        user.account_non_locked = true;
        user.lockout_time = Some(now - Duration::minutes(30));
        assert!(user.is_account_non_locked(now));
    }

    #[test]
    fn test_disabled_or_inactive_blocks_sign_in() {
        let now = Utc::now();
        let mut user = sample_user();
        user.enabled = false;
        assert!(!user.is_sign_in_allowed(now));

        let mut user = sample_user();
        user.status = UserStatus::Suspended;
        assert!(!user.is_sign_in_allowed(now));
    }

    #[test]
    fn test_authorities() {
        let mut user = sample_user();
        user.roles = BTreeSet::from([Role::User, Role::Admin]);
        let authorities = user.authorities();
        assert!(authorities.contains(&"ROLE_USER"));
        assert!(authorities.contains(&"ROLE_ADMIN"));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
    }
}
