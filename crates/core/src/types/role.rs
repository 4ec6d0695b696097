//! User roles and their authority labels.

use serde::{Deserialize, Serialize};

/// Role assigned to a user account.
///
/// Roles are a flat enumeration; a user carries a set of them. Authorization
/// checks at the API boundary are expressed as required-role predicates over
/// that set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Standard customer account.
    User,
    /// Administrator with full access.
    Admin,
    /// Business operations manager.
    Manager,
    /// Customer service representative.
    CustomerService,
    /// Stock and catalog management.
    InventoryManager,
}

impl Role {
    /// The capability label granted by this role.
    ///
    /// A pure translation table from role tag to authority string; the
    /// boundary layer hands these to whatever enforces access control.
    #[must_use]
    pub const fn authority(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
            Self::Manager => "ROLE_MANAGER",
            Self::CustomerService => "ROLE_CUSTOMER_SERVICE",
            Self::InventoryManager => "ROLE_INVENTORY_MANAGER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::CustomerService => "CUSTOMER_SERVICE",
            Self::InventoryManager => "INVENTORY_MANAGER",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "CUSTOMER_SERVICE" => Ok(Self::CustomerService),
            "INVENTORY_MANAGER" => Ok(Self::InventoryManager),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
