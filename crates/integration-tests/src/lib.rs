//! Shared helpers for the Quince integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use quince_commerce::models::User;
use quince_commerce::services::Mailer;
use quince_commerce::{CommerceConfig, Store};
use quince_server::state::AppState;

/// Mailer double that counts the side effects it was asked for.
#[derive(Default)]
pub struct CountingMailer {
    pub verifications: AtomicUsize,
    pub confirmations: AtomicUsize,
}

impl CountingMailer {
    #[must_use]
    pub fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.load(Ordering::SeqCst)
    }
}

impl Mailer for CountingMailer {
    fn send_verification_email(&self, _user: &User) {
        self.verifications.fetch_add(1, Ordering::SeqCst);
    }

    fn send_order_confirmation(&self, _user: &User, _order_number: &str) {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
    }
}

/// A fresh application router over an empty store with default thresholds.
#[must_use]
pub fn test_app() -> (Router, Store) {
    let store = Store::new();
    let state = AppState::new(store.clone(), CommerceConfig::default());
    (quince_server::app(state), store)
}

/// Identity headers for an API request: user ID plus comma-separated roles.
#[derive(Debug, Clone, Copy)]
pub struct Identity<'a> {
    pub user_id: i64,
    pub roles: &'a str,
}

/// Drive one request through the router and decode the JSON response.
///
/// Returns the status and the parsed body (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    identity: Option<Identity<'_>>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(identity) = identity {
        builder = builder
            .header("x-user-id", identity.user_id.to_string())
            .header("x-user-roles", identity.roles);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
