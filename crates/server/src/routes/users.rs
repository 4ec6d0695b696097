//! User management route handlers.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use quince_commerce::models::{Address, NewAddress, User};
use quince_commerce::services::{ChangePassword, RegisterAccount, UpdateAddress, UpdateProfile};
use quince_commerce::Page;
use quince_core::{AddressId, AddressKind, Email, Role, UserId};

use crate::error::Result;
use crate::middleware::Caller;
use crate::routes::Paging;
use crate::state::AppState;
use crate::validate::{optional_within, required_within, FieldErrors};

/// Create the user routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/username/{username}", get(get_by_username))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
        .route("/{id}/password", put(change_password))
        .route("/{id}/status", put(set_status))
        .route("/{id}/lock", put(set_lock))
        .route("/{id}/verify-email", put(verify_email))
        .route("/{id}/roles", put(update_roles))
        .route("/{id}/addresses", get(list_addresses).post(add_address))
        .route(
            "/{id}/addresses/{address_id}",
            put(update_address).delete(remove_address),
        )
}

/// User creation request (admin path; same shape as registration).
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// POST /api/v1/users
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    caller.require_any(&[Role::Admin])?;

    let mut errors = FieldErrors::new();
    errors.check(
        "username",
        (3..=50).contains(&request.username.len()),
        "Username must be between 3 and 50 characters",
    );
    let email = match Email::parse(&request.email) {
        Ok(email) => Some(email),
        Err(err) => {
            errors.push("email", err.to_string());
            None
        }
    };
    errors.check(
        "first_name",
        required_within(&request.first_name, 50),
        "First name is required",
    );
    errors.check(
        "last_name",
        required_within(&request.last_name, 50),
        "Last name is required",
    );
    errors.into_result()?;

    let Some(email) = email else {
        unreachable!("missing email is rejected by validation above")
    };

    let user = state.accounts().register(RegisterAccount {
        username: request.username,
        email,
        password: request.password,
        first_name: request.first_name,
        last_name: request.last_name,
        phone_number: request.phone_number,
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users
async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<User>>> {
    caller.require_any(&[Role::Admin])?;
    Ok(Json(state.accounts().list_users(paging.request())))
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// GET /api/v1/users/search
async fn search(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<User>>> {
    caller.require_any(&[Role::Admin])?;
    let paging = Paging {
        page: params.page,
        per_page: params.per_page,
    };
    Ok(Json(
        state.accounts().search_users(&params.q, paging.request()),
    ))
}

/// GET /api/v1/users/{id}
async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    caller.require_self_or_any(id, &[Role::Admin])?;
    Ok(Json(state.accounts().get_user(id)?))
}

/// GET /api/v1/users/username/{username}
async fn get_by_username(
    State(state): State<AppState>,
    caller: Caller,
    Path(username): Path<String>,
) -> Result<Json<User>> {
    let user = state.accounts().get_user_by_username(&username)?;
    caller.require_self_or_any(user.id, &[Role::Admin])?;
    Ok(Json(user))
}

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// PUT /api/v1/users/{id}
async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    caller.require_self_or_any(id, &[Role::Admin])?;

    let mut errors = FieldErrors::new();
    errors.check(
        "first_name",
        required_within(&request.first_name, 50),
        "First name is required",
    );
    errors.check(
        "last_name",
        required_within(&request.last_name, 50),
        "Last name is required",
    );
    errors.check(
        "phone_number",
        optional_within(request.phone_number.as_deref(), 20),
        "Phone number must not exceed 20 characters",
    );
    errors.into_result()?;

    let user = state.accounts().update_profile(
        id,
        UpdateProfile {
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number,
        },
    )?;
    Ok(Json(user))
}

/// Password change request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

/// PUT /api/v1/users/{id}/password
async fn change_password(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    caller.require_self_or_any(id, &[Role::Admin])?;

    let mut errors = FieldErrors::new();
    errors.check(
        "new_password",
        request.new_password.expose_secret().len()
            >= state.commerce_config().min_password_length,
        "Password must be at least 8 characters",
    );
    errors.into_result()?;

    state.accounts().change_password(
        id,
        ChangePassword {
            current_password: request.current_password,
            new_password: request.new_password,
            confirm_password: request.confirm_password,
        },
    )?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/{id}
async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    caller.require_any(&[Role::Admin])?;
    state.accounts().delete_user(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enable/disable request body.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub enabled: bool,
}

/// PUT /api/v1/users/{id}/status
async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<User>> {
    caller.require_any(&[Role::Admin])?;
    Ok(Json(state.accounts().set_enabled(id, request.enabled)?))
}

/// Lock/unlock request body.
#[derive(Debug, Deserialize)]
pub struct SetLockRequest {
    pub locked: bool,
}

/// PUT /api/v1/users/{id}/lock
async fn set_lock(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
    Json(request): Json<SetLockRequest>,
) -> Result<Json<User>> {
    caller.require_any(&[Role::Admin])?;
    Ok(Json(state.accounts().set_locked(id, request.locked)?))
}

/// PUT /api/v1/users/{id}/verify-email
async fn verify_email(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    caller.require_any(&[Role::Admin])?;
    Ok(Json(state.accounts().verify_email(id)?))
}

/// Role replacement request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: BTreeSet<Role>,
}

/// PUT /api/v1/users/{id}/roles
async fn update_roles(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
    Json(request): Json<UpdateRolesRequest>,
) -> Result<Json<User>> {
    caller.require_any(&[Role::Admin])?;
    Ok(Json(state.accounts().update_roles(id, request.roles)?))
}

// =============================================================================
// Addresses
// =============================================================================

/// Address creation/update request body.
#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub kind: AddressKind,
    pub street_address: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub company: Option<String>,
}

const fn default_true() -> bool {
    true
}

fn validate_address(request: &AddressRequest) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.check(
        "street_address",
        required_within(&request.street_address, 255),
        "Street address is required",
    );
    errors.check("city", required_within(&request.city, 100), "City is required");
    errors.check("state", required_within(&request.state, 100), "State is required");
    errors.check(
        "postal_code",
        required_within(&request.postal_code, 20),
        "Postal code is required",
    );
    errors.check(
        "country",
        required_within(&request.country, 100),
        "Country is required",
    );
    errors.into_result()
}

/// GET /api/v1/users/{id}/addresses
async fn list_addresses(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Address>>> {
    caller.require_self_or_any(id, &[Role::Admin])?;
    Ok(Json(state.accounts().list_addresses(id)?))
}

/// POST /api/v1/users/{id}/addresses
async fn add_address(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<UserId>,
    Json(request): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    caller.require_self_or_any(id, &[Role::Admin])?;
    validate_address(&request)?;

    let address = state.accounts().add_address(NewAddress {
        user_id: id,
        kind: request.kind,
        street_address: request.street_address,
        address_line2: request.address_line2,
        city: request.city,
        state: request.state,
        postal_code: request.postal_code,
        country: request.country,
        is_default: request.is_default,
        first_name: request.first_name,
        last_name: request.last_name,
        phone_number: request.phone_number,
        company: request.company,
    })?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// PUT /api/v1/users/{id}/addresses/{address_id}
async fn update_address(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, address_id)): Path<(UserId, AddressId)>,
    Json(request): Json<AddressRequest>,
) -> Result<Json<Address>> {
    caller.require_self_or_any(id, &[Role::Admin])?;
    validate_address(&request)?;

    let address = state.accounts().update_address(
        id,
        address_id,
        UpdateAddress {
            kind: request.kind,
            street_address: request.street_address,
            address_line2: request.address_line2,
            city: request.city,
            state: request.state,
            postal_code: request.postal_code,
            country: request.country,
            is_default: request.is_default,
            active: request.active,
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number,
            company: request.company,
        },
    )?;
    Ok(Json(address))
}

/// DELETE /api/v1/users/{id}/addresses/{address_id}
async fn remove_address(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, address_id)): Path<(UserId, AddressId)>,
) -> Result<StatusCode> {
    caller.require_self_or_any(id, &[Role::Admin])?;
    state.accounts().remove_address(id, address_id)?;
    Ok(StatusCode::NO_CONTENT)
}
