//! Order route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use quince_commerce::models::Order;
use quince_commerce::services::{OrderLine, PlaceOrder};
use quince_commerce::Page;
use quince_core::{AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, Role, UserId};

use crate::error::Result;
use crate::middleware::Caller;
use crate::routes::Paging;
use crate::state::AppState;

/// Roles allowed to look at other users' orders.
const ORDER_STAFF: &[Role] = &[Role::Admin, Role::Manager, Role::CustomerService];

/// Create the order routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(place))
        .route("/number/{order_number}", get(get_by_number))
        .route("/user/{user_id}", get(list_for_user))
        .route("/{id}", get(get_by_id))
        .route("/{id}/status", put(update_status))
        .route("/{id}/cancel", post(cancel))
        .route("/{id}/payment-status", put(update_payment_status))
}

/// One requested order line.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Order placement request body.
///
/// Tax, shipping and discount are computed upstream and supplied here.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub shipping_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub notes: Option<String>,
}

/// POST /api/v1/orders
async fn place(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders().place_order(
        caller.user_id,
        PlaceOrder {
            items: request
                .items
                .into_iter()
                .map(|line| OrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
            shipping_address_id: request.shipping_address_id,
            billing_address_id: request.billing_address_id,
            payment_method: request.payment_method,
            tax_amount: request.tax_amount,
            shipping_amount: request.shipping_amount,
            discount_amount: request.discount_amount,
            notes: request.notes,
        },
    )?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Require that the caller owns the order or is order staff.
fn require_owner_or_staff(caller: &Caller, order: &Order) -> Result<()> {
    caller.require_self_or_any(order.user_id, ORDER_STAFF)
}

/// GET /api/v1/orders/{id}
async fn get_by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.orders().get_order(id)?;
    require_owner_or_staff(&caller, &order)?;
    Ok(Json(order))
}

/// GET /api/v1/orders/number/{order_number}
async fn get_by_number(
    State(state): State<AppState>,
    caller: Caller,
    Path(order_number): Path<String>,
) -> Result<Json<Order>> {
    let order = state.orders().get_order_by_number(&order_number)?;
    require_owner_or_staff(&caller, &order)?;
    Ok(Json(order))
}

/// GET /api/v1/orders/user/{user_id}
async fn list_for_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<UserId>,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<Order>>> {
    caller.require_self_or_any(user_id, ORDER_STAFF)?;
    Ok(Json(
        state.orders().list_user_orders(user_id, paging.request())?,
    ))
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// PUT /api/v1/orders/{id}/status
async fn update_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    caller.require_any(&[Role::Admin, Role::Manager])?;

    let changed_by = changed_by_label(&state, &caller);
    let order = state
        .orders()
        .update_status(id, request.status, request.notes, &changed_by)?;
    Ok(Json(order))
}

/// Cancellation request body.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub notes: Option<String>,
}

/// POST /api/v1/orders/{id}/cancel
async fn cancel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<OrderId>,
    body: Option<Json<CancelRequest>>,
) -> Result<Json<Order>> {
    let orders = state.orders();
    let order = orders.get_order(id)?;
    caller.require_self_or_any(order.user_id, &[Role::Admin])?;

    let Json(request) = body.unwrap_or_default();
    let changed_by = changed_by_label(&state, &caller);
    Ok(Json(orders.cancel_order(id, request.notes, &changed_by)?))
}

/// Payment status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// PUT /api/v1/orders/{id}/payment-status
async fn update_payment_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<Order>> {
    caller.require_any(&[Role::Admin, Role::Manager])?;
    Ok(Json(
        state.orders().set_payment_status(id, request.payment_status)?,
    ))
}

/// The acting identity recorded in status history: the caller's username
/// when resolvable, otherwise the raw user ID.
fn changed_by_label(state: &AppState, caller: &Caller) -> String {
    state
        .accounts()
        .get_user(caller.user_id)
        .map_or_else(|_| caller.user_id.to_string(), |user| user.username)
}
