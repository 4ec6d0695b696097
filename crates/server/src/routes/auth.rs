//! Authentication route handlers.
//!
//! Registration, login and email verification. Token issuance is the
//! upstream gateway's concern; a successful login returns the account and
//! its authority labels for the gateway to encode.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use quince_commerce::models::User;
use quince_commerce::services::RegisterAccount;
use quince_core::{Email, UserId};

use crate::error::Result;
use crate::state::AppState;
use crate::validate::{optional_within, required_within, FieldErrors};

/// Create the auth routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let mut errors = FieldErrors::new();
    errors.check(
        "username",
        (3..=50).contains(&request.username.len()) && !request.username.trim().is_empty(),
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
        "password",
        request.password.expose_secret().len() >= state.commerce_config().min_password_length,
        "Password must be at least 8 characters",
    );
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

    let Some(email) = email else {
        unreachable!("email errors are collected above")
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

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: SecretString,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    /// Authority labels for the gateway to encode into its token.
    pub authorities: Vec<&'static str>,
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state
        .accounts()
        .authenticate(&request.username, &request.password)?;
    let authorities = user.authorities();
    Ok(Json(LoginResponse { user, authorities }))
}

/// Email verification request body.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub user_id: UserId,
}

/// POST /api/v1/auth/verify-email
async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<User>> {
    let user = state.accounts().verify_email(request.user_id)?;
    Ok(Json(user))
}
