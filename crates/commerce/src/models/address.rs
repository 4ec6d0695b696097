//! Postal address record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use quince_core::{AddressId, AddressKind, UserId};

/// A postal address owned by a user.
///
/// Orders reference a shipping and a billing address by ID. The optional
/// name fields override the owner's name on the shipping label.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub kind: AddressKind,
    pub street_address: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub active: bool,
    /// Recipient override; falls back to the owning user's name.
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Single-line postal rendering.
    #[must_use]
    pub fn full_address(&self) -> String {
        let mut out = self.street_address.clone();
        if let Some(line2) = self.address_line2.as_deref()
            && !line2.trim().is_empty()
        {
            out.push_str(", ");
            out.push_str(line2);
        }
        out.push_str(&format!(
            ", {}, {} {}, {}",
            self.city, self.state, self.postal_code, self.country
        ));
        out
    }

    /// Recipient name: the override if both parts are set, otherwise the
    /// supplied fallback (normally the owner's name).
    #[must_use]
    pub fn recipient_name(&self, fallback: &str) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => fallback.to_owned(),
        }
    }
}

/// Fields for creating an address; the store assigns ID and timestamps.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: UserId,
    pub kind: AddressKind,
    pub street_address: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub company: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_address() -> Address {
        let now = Utc::now();
        Address {
            id: AddressId::new(1),
            user_id: UserId::new(1),
            kind: AddressKind::Both,
            street_address: "12 Orchard Lane".to_owned(),
            address_line2: None,
            city: "Portland".to_owned(),
            state: "OR".to_owned(),
            postal_code: "97201".to_owned(),
            country: "USA".to_owned(),
            is_default: true,
            active: true,
            first_name: None,
            last_name: None,
            phone_number: None,
            company: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_full_address() {
        assert_eq!(
            sample_address().full_address(),
            "12 Orchard Lane, Portland, OR 97201, USA"
        );

        let mut address = sample_address();
        address.address_line2 = Some("Unit 4".to_owned());
        assert_eq!(
            address.full_address(),
            "12 Orchard Lane, Unit 4, Portland, OR 97201, USA"
        );
    }

    #[test]
    fn test_recipient_name_override() {
        let mut address = sample_address();
        assert_eq!(address.recipient_name("Alice Archer"), "Alice Archer");

        address.first_name = Some("Bob".to_owned());
        assert_eq!(address.recipient_name("Alice Archer"), "Alice Archer");

        address.last_name = Some("Barker".to_owned());
        assert_eq!(address.recipient_name("Alice Archer"), "Bob Barker");
    }
}
