//! Caller identity extractor and role guards.
//!
//! Token issuance and verification are handled by an upstream gateway,
//! which forwards the resolved identity as trusted headers:
//!
//! - `x-user-id`: the caller's numeric user ID
//! - `x-user-roles`: comma-separated role tags (e.g. `USER,ADMIN`)
//!
//! Handlers that require authentication take a [`Caller`] parameter; public
//! handlers simply omit it.

use std::collections::BTreeSet;

use axum::{extract::FromRequestParts, http::request::Parts};

use quince_core::{Role, UserId};

use crate::error::ApiError;

/// The HTTP header carrying the resolved user ID.
pub const USER_ID_HEADER: &str = "x-user-id";
/// The HTTP header carrying the resolved role set.
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// The authenticated caller, as resolved by the upstream gateway.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: UserId,
    pub roles: BTreeSet<Role>,
}

impl Caller {
    /// Whether the caller holds a role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Require at least one of the given roles.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if none of the roles are held.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.iter().any(|role| self.has_role(*role)) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "requires one of: {}",
                roles
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }

    /// Require that the caller is the given user, or holds one of the
    /// given roles.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` otherwise.
    pub fn require_self_or_any(&self, user_id: UserId, roles: &[Role]) -> Result<(), ApiError> {
        if self.user_id == user_id {
            return Ok(());
        }
        self.require_any(roles)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .map(UserId::new)
            .ok_or_else(|| ApiError::Unauthenticated("missing caller identity".to_owned()))?;

        let roles = parts
            .headers
            .get(USER_ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(parse_roles)
            .transpose()?
            .unwrap_or_default();

        Ok(Self { user_id, roles })
    }
}

/// Parse a comma-separated role list.
fn parse_roles(raw: &str) -> Result<BTreeSet<Role>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| {
            tag.parse::<Role>()
                .map_err(|_| ApiError::Unauthenticated(format!("unknown role: {tag}")))
        })
        .collect()
}
