//! HTTP route handlers for the JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//!
//! # Auth (public)
//! POST /api/v1/auth/register                - Register an account
//! POST /api/v1/auth/login                   - Authenticate
//! POST /api/v1/auth/verify-email            - Verify an email address
//!
//! # Users
//! POST   /api/v1/users                      - Create user (ADMIN)
//! GET    /api/v1/users                      - List users (ADMIN)
//! GET    /api/v1/users/search?q=            - Search users (ADMIN)
//! GET    /api/v1/users/{id}                 - Get user (self or ADMIN)
//! GET    /api/v1/users/username/{username}  - Get by username (self or ADMIN)
//! PUT    /api/v1/users/{id}                 - Update profile (self or ADMIN)
//! PUT    /api/v1/users/{id}/password        - Change password (self or ADMIN)
//! DELETE /api/v1/users/{id}                 - Delete user (ADMIN)
//! PUT    /api/v1/users/{id}/status          - Enable/disable (ADMIN)
//! PUT    /api/v1/users/{id}/lock            - Lock/unlock (ADMIN)
//! PUT    /api/v1/users/{id}/verify-email    - Verify email (ADMIN)
//! PUT    /api/v1/users/{id}/roles           - Replace roles (ADMIN)
//! GET    /api/v1/users/{id}/addresses       - List addresses (self or ADMIN)
//! POST   /api/v1/users/{id}/addresses       - Add address (self or ADMIN)
//! PUT    /api/v1/users/{id}/addresses/{aid} - Update address (self or ADMIN)
//! DELETE /api/v1/users/{id}/addresses/{aid} - Remove address (self or ADMIN)
//!
//! # Products
//! POST /api/v1/products                     - Create (ADMIN or INVENTORY_MANAGER)
//! GET  /api/v1/products                     - List
//! GET  /api/v1/products/search              - Search with filters
//! GET  /api/v1/products/featured            - Featured products
//! GET  /api/v1/products/low-stock           - Low stock (ADMIN or INVENTORY_MANAGER)
//! GET  /api/v1/products/sku/{sku}           - Get by SKU
//! GET  /api/v1/products/category/{id}       - Products in category
//! GET  /api/v1/products/{id}                - Get (records a view)
//! PUT  /api/v1/products/{id}                - Update (ADMIN or INVENTORY_MANAGER)
//! DELETE /api/v1/products/{id}              - Delete (ADMIN)
//! PUT  /api/v1/products/{id}/stock          - Set stock (ADMIN or INVENTORY_MANAGER)
//! PUT  /api/v1/products/{id}/status         - Toggle active (ADMIN or INVENTORY_MANAGER)
//! PUT  /api/v1/products/{id}/featured       - Toggle featured (ADMIN or INVENTORY_MANAGER)
//! POST /api/v1/products/{id}/reviews        - Submit review (authenticated)
//! PUT  /api/v1/products/{id}/reviews/{rid}/approve - Approve (ADMIN or MANAGER)
//!
//! # Categories
//! POST /api/v1/categories                   - Create (ADMIN or INVENTORY_MANAGER)
//! GET  /api/v1/categories                   - Root categories
//! GET  /api/v1/categories/slug/{slug}       - Get by slug
//! GET  /api/v1/categories/{id}              - Get
//! GET  /api/v1/categories/{id}/children     - Direct children
//! PUT  /api/v1/categories/{id}              - Update (ADMIN or INVENTORY_MANAGER)
//! DELETE /api/v1/categories/{id}            - Delete (ADMIN)
//!
//! # Orders
//! POST /api/v1/orders                       - Place order (authenticated)
//! GET  /api/v1/orders/{id}                  - Get (owner or staff)
//! GET  /api/v1/orders/number/{number}       - Get by number (owner or staff)
//! GET  /api/v1/orders/user/{user_id}        - User's orders (self or staff)
//! PUT  /api/v1/orders/{id}/status           - Update status (ADMIN or MANAGER)
//! POST /api/v1/orders/{id}/cancel           - Cancel (owner or ADMIN)
//! PUT  /api/v1/orders/{id}/payment-status   - Update payment (ADMIN or MANAGER)
//!
//! # Cart (authenticated; always the caller's own cart)
//! GET    /api/v1/cart                       - Cart with derived totals
//! POST   /api/v1/cart/items                 - Add item
//! PUT    /api/v1/cart/items/{product_id}    - Set quantity
//! DELETE /api/v1/cart/items/{product_id}    - Remove item
//! DELETE /api/v1/cart                       - Clear cart
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use axum::Router;
use serde::Deserialize;

use quince_commerce::PageRequest;

use crate::state::AppState;

/// Common pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paging {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl Paging {
    /// Convert to a domain page request with defaults applied.
    #[must_use]
    pub fn request(self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/v1/auth", auth::routes())
        .nest("/api/v1/users", users::routes())
        .nest("/api/v1/products", products::routes())
        .nest("/api/v1/categories", categories::routes())
        .nest("/api/v1/orders", orders::routes())
        .nest("/api/v1/cart", cart::routes())
}
