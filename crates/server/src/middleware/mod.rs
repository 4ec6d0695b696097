//! Request middleware: caller identity, request IDs, error payloads.

pub mod auth;
pub mod error_context;
pub mod request_id;

pub use auth::Caller;
pub use error_context::error_payload;
pub use request_id::request_id_middleware;
