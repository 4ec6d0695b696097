//! Address entity operations.

use chrono::Utc;

use quince_core::{AddressId, UserId};

use crate::error::{CommerceError, Result};
use crate::models::{Address, NewAddress};

use super::{Sequences, State};

impl State {
    /// Create an address for a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub fn create_address(&mut self, new: NewAddress) -> Result<Address> {
        if !self.users.contains_key(&new.user_id) {
            return Err(CommerceError::not_found("user", new.user_id));
        }

        let now = Utc::now();
        let id = AddressId::new(Sequences::next(&mut self.sequences.addresses));
        let address = Address {
            id,
            user_id: new.user_id,
            kind: new.kind,
            street_address: new.street_address,
            address_line2: new.address_line2,
            city: new.city,
            state: new.state,
            postal_code: new.postal_code,
            country: new.country,
            is_default: new.is_default,
            active: true,
            first_name: new.first_name,
            last_name: new.last_name,
            phone_number: new.phone_number,
            company: new.company,
            created_at: now,
            updated_at: now,
        };

        self.addresses.insert(id, address.clone());
        Ok(address)
    }

    /// Look up an address by ID.
    #[must_use]
    pub fn find_address(&self, id: AddressId) -> Option<Address> {
        self.addresses.get(&id).cloned()
    }

    /// Look up an address by ID, failing with `NotFound` when absent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no address has this ID.
    pub fn get_address(&self, id: AddressId) -> Result<Address> {
        self.find_address(id)
            .ok_or_else(|| CommerceError::not_found("address", id))
    }

    /// Persist an updated address, refreshing the `updated_at` stamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the address does not exist.
    pub fn update_address(&mut self, mut address: Address) -> Result<Address> {
        if !self.addresses.contains_key(&address.id) {
            return Err(CommerceError::not_found("address", address.id));
        }
        address.updated_at = Utc::now();
        self.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the address does not exist.
    pub fn delete_address(&mut self, id: AddressId) -> Result<()> {
        if self.addresses.remove(&id).is_none() {
            return Err(CommerceError::not_found("address", id));
        }
        Ok(())
    }

    /// A user's addresses sorted by ID.
    #[must_use]
    pub fn addresses_for_user(&self, user_id: UserId) -> Vec<Address> {
        let mut addresses: Vec<_> = self
            .addresses
            .values()
            .filter(|address| address.user_id == user_id)
            .cloned()
            .collect();
        addresses.sort_by_key(|address| address.id);
        addresses
    }
}
