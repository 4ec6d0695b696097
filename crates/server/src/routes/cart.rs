//! Cart route handlers.
//!
//! Every endpoint operates on the authenticated caller's own cart; totals
//! in the response are derived on read.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use quince_commerce::models::CartSummary;
use quince_core::ProductId;

use crate::error::Result;
use crate::middleware::Caller;
use crate::state::AppState;

/// Create the cart routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(show).delete(clear))
        .route("/items", post(add_item))
        .route("/items/{product_id}", put(update_item).delete(remove_item))
}

/// GET /api/v1/cart
async fn show(State(state): State<AppState>, caller: Caller) -> Result<Json<CartSummary>> {
    Ok(Json(state.carts().get_cart(caller.user_id)?))
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// POST /api/v1/cart/items
async fn add_item(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartSummary>> {
    Ok(Json(state.carts().add_item(
        caller.user_id,
        request.product_id,
        request.quantity,
    )?))
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// PUT /api/v1/cart/items/{product_id}
async fn update_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartSummary>> {
    Ok(Json(state.carts().update_item_quantity(
        caller.user_id,
        product_id,
        request.quantity,
    )?))
}

/// DELETE /api/v1/cart/items/{product_id}
async fn remove_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartSummary>> {
    Ok(Json(state.carts().remove_item(caller.user_id, product_id)?))
}

/// DELETE /api/v1/cart
async fn clear(State(state): State<AppState>, caller: Caller) -> Result<Json<CartSummary>> {
    Ok(Json(state.carts().clear(caller.user_id)?))
}
