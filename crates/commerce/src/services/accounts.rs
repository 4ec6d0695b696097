//! Account service.
//!
//! Registration, profile and credential lifecycle, the account security
//! state machine (enable/disable, lock/unlock, failed-login bookkeeping),
//! and the user's addresses.

use std::collections::BTreeSet;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use quince_core::{AddressId, AddressKind, Email, Role, UserId, UserStatus};

use crate::config::CommerceConfig;
use crate::error::{CommerceError, Result};
use crate::models::{Address, NewAddress, NewUser, User};
use crate::page::{Page, PageRequest};
use crate::services::mailer::Mailer;
use crate::store::{Store, UnitOfWork};

/// Registration request.
#[derive(Debug, Clone)]
pub struct RegisterAccount {
    pub username: String,
    pub email: Email,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Profile update request (names and phone only).
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Password change request.
#[derive(Debug, Clone)]
pub struct ChangePassword {
    pub current_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

/// Address update request (full replacement of the mutable fields).
#[derive(Debug, Clone)]
pub struct UpdateAddress {
    pub kind: AddressKind,
    pub street_address: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub active: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub company: Option<String>,
}

/// Account operations.
pub struct AccountService<'a> {
    store: &'a Store,
    config: &'a CommerceConfig,
    mailer: &'a dyn Mailer,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: &'a Store, config: &'a CommerceConfig, mailer: &'a dyn Mailer) -> Self {
        Self {
            store,
            config,
            mailer,
        }
    }

    // =========================================================================
    // Registration & lookup
    // =========================================================================

    /// Register a new account.
    ///
    /// The account starts disabled-for-sign-in: `PENDING_VERIFICATION`
    /// status, unverified email, role set `{USER}`, an empty cart, and a
    /// verification email queued exactly once after commit.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the username (checked first) or email is
    /// already registered, `InvalidArgument` if the password is shorter
    /// than the configured minimum.
    pub fn register(&self, request: RegisterAccount) -> Result<User> {
        tracing::info!(username = %request.username, "creating new user");

        if request.password.expose_secret().len() < self.config.min_password_length {
            return Err(CommerceError::invalid(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        let password_hash = hash_password(request.password.expose_secret())?;

        let mut uow = self.store.begin();
        if uow.username_exists(&request.username) {
            return Err(CommerceError::conflict(format!(
                "username already exists: {}",
                request.username
            )));
        }
        if uow.email_exists(request.email.as_str()) {
            return Err(CommerceError::conflict(format!(
                "email already exists: {}",
                request.email
            )));
        }

        let user = uow.create_user(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number,
            enabled: true,
            email_verified: false,
            status: UserStatus::PendingVerification,
            roles: BTreeSet::from([Role::User]),
        })?;
        uow.create_cart(user.id)?;
        uow.commit();

        tracing::info!(user_id = %user.id, "user created successfully");
        self.mailer.send_verification_email(&user);

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.store.snapshot().get_user(id)
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.store
            .snapshot()
            .find_user_by_username(username)
            .ok_or_else(|| CommerceError::not_found("user", username))
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.store
            .snapshot()
            .find_user_by_email(email)
            .ok_or_else(|| CommerceError::not_found("user", email))
    }

    /// List all users, paginated.
    #[must_use]
    pub fn list_users(&self, page: PageRequest) -> Page<User> {
        Page::from_vec(self.store.snapshot().list_users(), page)
    }

    /// Search users by username, email or name, paginated.
    #[must_use]
    pub fn search_users(&self, query: &str, page: PageRequest) -> Page<User> {
        Page::from_vec(self.store.snapshot().search_users(query), page)
    }

    // =========================================================================
    // Profile & credentials
    // =========================================================================

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn update_profile(&self, id: UserId, request: UpdateProfile) -> Result<User> {
        tracing::info!(user_id = %id, "updating user");

        let mut uow = self.store.begin();
        let mut user = uow.get_user(id)?;
        user.first_name = request.first_name;
        user.last_name = request.last_name;
        user.phone_number = request.phone_number;
        let user = uow.update_user(user)?;
        uow.commit();
        Ok(user)
    }

    /// Change the password.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist, `InvalidArgument` if
    /// the current password does not match the stored hash, if the
    /// confirmation differs from the new password, or if the new password
    /// is too short. No check prevents reusing the current password.
    pub fn change_password(&self, id: UserId, request: ChangePassword) -> Result<()> {
        tracing::info!(user_id = %id, "changing password");

        let mut uow = self.store.begin();
        let mut user = uow.get_user(id)?;

        if !verify_password(request.current_password.expose_secret(), &user.password_hash) {
            return Err(CommerceError::invalid("current password is incorrect"));
        }
        if request.new_password.expose_secret() != request.confirm_password.expose_secret() {
            return Err(CommerceError::invalid(
                "new password and confirmation do not match",
            ));
        }
        if request.new_password.expose_secret().len() < self.config.min_password_length {
            return Err(CommerceError::invalid(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        user.password_hash = hash_password(request.new_password.expose_secret())?;
        uow.update_user(user)?;
        uow.commit();

        tracing::info!(user_id = %id, "password changed successfully");
        Ok(())
    }

    /// Delete a user and everything the aggregate owns.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn delete_user(&self, id: UserId) -> Result<()> {
        tracing::info!(user_id = %id, "deleting user");

        let mut uow = self.store.begin();
        uow.delete_user(id)?;
        uow.commit();
        Ok(())
    }

    // =========================================================================
    // Security state machine
    // =========================================================================

    /// Mark the email verified and activate the account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn verify_email(&self, id: UserId) -> Result<User> {
        tracing::info!(user_id = %id, "verifying email");

        let mut uow = self.store.begin();
        let mut user = uow.get_user(id)?;
        user.email_verified = true;
        user.status = UserStatus::Active;
        let user = uow.update_user(user)?;
        uow.commit();
        Ok(user)
    }

    /// Enable or disable the account.
    ///
    /// Disabling always lands on `INACTIVE`, even from `SUSPENDED`;
    /// enabling always lands on `ACTIVE`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn set_enabled(&self, id: UserId, enabled: bool) -> Result<User> {
        tracing::info!(user_id = %id, enabled, "toggling user status");

        let mut uow = self.store.begin();
        let mut user = uow.get_user(id)?;
        user.enabled = enabled;
        user.status = if enabled {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        };
        let user = uow.update_user(user)?;
        uow.commit();
        Ok(user)
    }

    /// Lock or unlock the account.
    ///
    /// Locking records the lockout timestamp; unlocking clears it and
    /// resets the failed-attempt counter.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn set_locked(&self, id: UserId, locked: bool) -> Result<User> {
        tracing::info!(user_id = %id, locked, "toggling user lock");

        let mut uow = self.store.begin();
        let mut user = uow.get_user(id)?;
        if locked {
            user.account_non_locked = false;
            user.lockout_time = Some(Utc::now());
        } else {
            user.account_non_locked = true;
            user.lockout_time = None;
            user.failed_login_attempts = 0;
        }
        let user = uow.update_user(user)?;
        uow.commit();
        Ok(user)
    }

    /// Replace the role set wholesale.
    ///
    /// No validation is applied to the new set; an empty set is accepted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn update_roles(&self, id: UserId, roles: BTreeSet<Role>) -> Result<User> {
        tracing::info!(user_id = %id, "updating roles");

        let mut uow = self.store.begin();
        let mut user = uow.get_user(id)?;
        user.roles = roles;
        let user = uow.update_user(user)?;
        uow.commit();
        Ok(user)
    }

    // =========================================================================
    // Login bookkeeping
    // =========================================================================

    /// Record a successful login: reset the failed counter, stamp the time.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn record_successful_login(&self, id: UserId) -> Result<()> {
        let mut uow = self.store.begin();
        let mut user = uow.get_user(id)?;
        user.failed_login_attempts = 0;
        user.last_login_at = Some(Utc::now());
        uow.update_user(user)?;
        uow.commit();
        Ok(())
    }

    /// Record a failed login attempt against a username or email.
    ///
    /// Unknown identifiers are a silent no-op. At the configured threshold
    /// of consecutive failures the account is locked.
    pub fn record_failed_login(&self, identifier: &str) {
        let mut uow = self.store.begin();
        let Some(user) = uow.find_user_by_identifier(identifier) else {
            return;
        };
        if self.note_failed_attempt(&mut uow, user).is_ok() {
            uow.commit();
        }
    }

    /// Authenticate by username or email and password.
    ///
    /// Applies the full eligibility gate (enabled, `ACTIVE`, not locked),
    /// records failed attempts on wrong passwords, and records the
    /// successful login on success. Token issuance is the boundary's
    /// concern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for unknown identifiers and wrong
    /// passwords, `AccountLocked` for locked accounts, `AccountDisabled`
    /// for disabled, suspended or unverified accounts.
    pub fn authenticate(&self, identifier: &str, password: &SecretString) -> Result<User> {
        let now = Utc::now();
        let mut uow = self.store.begin();

        let Some(user) = uow.find_user_by_identifier(identifier) else {
            return Err(CommerceError::InvalidCredentials);
        };

        if !user.is_account_non_locked(now) {
            return Err(CommerceError::AccountLocked);
        }
        if !user.enabled || user.status != UserStatus::Active {
            return Err(CommerceError::AccountDisabled);
        }

        if !verify_password(password.expose_secret(), &user.password_hash) {
            self.note_failed_attempt(&mut uow, user)?;
            uow.commit();
            return Err(CommerceError::InvalidCredentials);
        }

        let mut user = user;
        user.failed_login_attempts = 0;
        user.last_login_at = Some(now);
        let user = uow.update_user(user)?;
        uow.commit();

        Ok(user)
    }

    fn note_failed_attempt(&self, uow: &mut UnitOfWork<'_>, mut user: User) -> Result<()> {
        user.failed_login_attempts += 1;
        if user.failed_login_attempts >= self.config.lockout_threshold {
            user.account_non_locked = false;
            user.lockout_time = Some(Utc::now());
            tracing::warn!(
                username = %user.username,
                attempts = user.failed_login_attempts,
                "user account locked due to failed login attempts"
            );
        }
        uow.update_user(user)?;
        Ok(())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Add an address to a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn add_address(&self, new: NewAddress) -> Result<Address> {
        let mut uow = self.store.begin();
        let address = uow.create_address(new)?;
        uow.commit();
        Ok(address)
    }

    /// Update one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the address does not exist or belongs to
    /// another user.
    pub fn update_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
        request: UpdateAddress,
    ) -> Result<Address> {
        let mut uow = self.store.begin();
        let mut address = uow.get_address(address_id)?;
        if address.user_id != user_id {
            return Err(CommerceError::not_found("address", address_id));
        }

        address.kind = request.kind;
        address.street_address = request.street_address;
        address.address_line2 = request.address_line2;
        address.city = request.city;
        address.state = request.state;
        address.postal_code = request.postal_code;
        address.country = request.country;
        address.is_default = request.is_default;
        address.active = request.active;
        address.first_name = request.first_name;
        address.last_name = request.last_name;
        address.phone_number = request.phone_number;
        address.company = request.company;

        let address = uow.update_address(address)?;
        uow.commit();
        Ok(address)
    }

    /// Remove one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the address does not exist or belongs to
    /// another user.
    pub fn remove_address(&self, user_id: UserId, address_id: AddressId) -> Result<()> {
        let mut uow = self.store.begin();
        let address = uow.get_address(address_id)?;
        if address.user_id != user_id {
            return Err(CommerceError::not_found("address", address_id));
        }
        uow.delete_address(address_id)?;
        uow.commit();
        Ok(())
    }

    /// List a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>> {
        let snapshot = self.store.snapshot();
        snapshot.get_user(user_id)?;
        Ok(snapshot.addresses_for_user(user_id))
    }

    /// Check a plaintext password against a user's stored hash.
    ///
    /// Exposed for the boundary's credential checks; does not touch the
    /// failed-attempt counter.
    #[must_use]
    pub fn password_matches(&self, user: &User, password: &SecretString) -> bool {
        verify_password(password.expose_secret(), &user.password_hash)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CommerceError::PasswordHash)
}

/// Verify a password against a PHC hash string.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
