//! User entity operations.

use chrono::Utc;

use quince_core::{UserId, UserStatus};

use crate::error::{CommerceError, Result};
use crate::models::{NewUser, User};

use super::{Sequences, State};

impl State {
    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the username or email is already taken; the
    /// username is checked first.
    pub fn create_user(&mut self, new: NewUser) -> Result<User> {
        if self.username_index.contains_key(&new.username) {
            return Err(CommerceError::conflict(format!(
                "username already exists: {}",
                new.username
            )));
        }
        if self.email_index.contains_key(new.email.as_str()) {
            return Err(CommerceError::conflict(format!(
                "email already exists: {}",
                new.email
            )));
        }

        let now = Utc::now();
        let id = UserId::new(Sequences::next(&mut self.sequences.users));
        let user = User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            phone_number: new.phone_number,
            enabled: new.enabled,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
            email_verified: new.email_verified,
            last_login_at: None,
            failed_login_attempts: 0,
            lockout_time: None,
            status: new.status,
            roles: new.roles,
            created_at: now,
            updated_at: now,
        };

        self.username_index.insert(user.username.clone(), id);
        self.email_index.insert(user.email.as_str().to_owned(), id);
        self.users.insert(id, user.clone());

        Ok(user)
    }

    /// Look up a user by ID.
    #[must_use]
    pub fn find_user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    /// Look up a user by ID, failing with `NotFound` when absent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user has this ID.
    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.find_user(id)
            .ok_or_else(|| CommerceError::not_found("user", id))
    }

    /// Look up a user by exact username.
    #[must_use]
    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        let id = self.username_index.get(username)?;
        self.users.get(id).cloned()
    }

    /// Look up a user by exact email.
    #[must_use]
    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let id = self.email_index.get(email)?;
        self.users.get(id).cloned()
    }

    /// Look up a user by username or email, in that order.
    #[must_use]
    pub fn find_user_by_identifier(&self, identifier: &str) -> Option<User> {
        self.find_user_by_username(identifier)
            .or_else(|| self.find_user_by_email(identifier))
    }

    /// Whether a username is taken.
    #[must_use]
    pub fn username_exists(&self, username: &str) -> bool {
        self.username_index.contains_key(username)
    }

    /// Whether an email is taken.
    #[must_use]
    pub fn email_exists(&self, email: &str) -> bool {
        self.email_index.contains_key(email)
    }

    /// Persist an updated user, refreshing the unique indexes and the
    /// `updated_at` stamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist, `Conflict` if the new
    /// username or email belongs to another user.
    pub fn update_user(&mut self, mut user: User) -> Result<User> {
        let existing = self.get_user(user.id)?;

        if user.username != existing.username {
            if self.username_index.contains_key(&user.username) {
                return Err(CommerceError::conflict(format!(
                    "username already exists: {}",
                    user.username
                )));
            }
            self.username_index.remove(&existing.username);
            self.username_index.insert(user.username.clone(), user.id);
        }

        if user.email != existing.email {
            if self.email_index.contains_key(user.email.as_str()) {
                return Err(CommerceError::conflict(format!(
                    "email already exists: {}",
                    user.email
                )));
            }
            self.email_index.remove(existing.email.as_str());
            self.email_index
                .insert(user.email.as_str().to_owned(), user.id);
        }

        user.updated_at = Utc::now();
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Delete a user and everything the user aggregate owns: the shopping
    /// cart, addresses, orders, and the user's product reviews.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn delete_user(&mut self, id: UserId) -> Result<()> {
        let user = self.get_user(id)?;

        self.username_index.remove(&user.username);
        self.email_index.remove(user.email.as_str());
        self.users.remove(&id);
        self.carts.remove(&id);

        let address_ids: Vec<_> = self
            .addresses
            .values()
            .filter(|address| address.user_id == id)
            .map(|address| address.id)
            .collect();
        for address_id in address_ids {
            self.addresses.remove(&address_id);
        }

        let order_ids: Vec<_> = self
            .orders
            .values()
            .filter(|order| order.user_id == id)
            .map(|order| (order.id, order.order_number.clone()))
            .collect();
        for (order_id, order_number) in order_ids {
            self.orders.remove(&order_id);
            self.order_number_index.remove(&order_number);
        }

        let product_ids: Vec<_> = self.products.keys().copied().collect();
        for product_id in product_ids {
            if let Some(mut product) = self.products.get(&product_id).cloned()
                && product.reviews.iter().any(|review| review.user_id == id)
            {
                product.reviews.retain(|review| review.user_id != id);
                self.products.insert(product_id, product);
            }
        }

        Ok(())
    }

    /// All users sorted by ID.
    #[must_use]
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<_> = self.users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        users
    }

    /// Users in a given lifecycle status, sorted by ID.
    #[must_use]
    pub fn users_by_status(&self, status: UserStatus) -> Vec<User> {
        let mut users: Vec<_> = self
            .users
            .values()
            .filter(|user| user.status == status)
            .cloned()
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }

    /// Case-insensitive substring search across username, email, first and
    /// last name, sorted by ID.
    #[must_use]
    pub fn search_users(&self, query: &str) -> Vec<User> {
        let needle = query.to_lowercase();
        let mut users: Vec<_> = self
            .users
            .values()
            .filter(|user| {
                user.username.to_lowercase().contains(&needle)
                    || user.email.as_str().to_lowercase().contains(&needle)
                    || user.first_name.to_lowercase().contains(&needle)
                    || user.last_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }
}
