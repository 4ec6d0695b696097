//! Middleware that completes error payloads with the request path.
//!
//! `IntoResponse` cannot see the request URI, so `ApiError` stores its
//! [`ErrorBody`] in the response extensions and this middleware re-renders
//! the body with the path filled in.

use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response, Json};

use crate::error::ErrorBody;

/// Attach the request path to error payloads.
pub async fn error_payload(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if let Some(body) = response.extensions_mut().remove::<ErrorBody>() {
        let status = response.status();
        let mut rebuilt = Json(body.with_path(path)).into_response();
        *rebuilt.status_mut() = status;
        // Keep correlation headers added by outer middleware intact; only
        // the body and content headers are replaced.
        for (name, value) in response.headers() {
            if !rebuilt.headers().contains_key(name) {
                rebuilt.headers_mut().insert(name.clone(), value.clone());
            }
        }
        return rebuilt;
    }

    response
}
