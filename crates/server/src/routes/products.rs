//! Product route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use quince_commerce::models::{Product, ProductImage, Review};
use quince_commerce::services::{CreateProduct, CreateReview, UpdateProduct};
use quince_commerce::store::ProductSearch;
use quince_commerce::Page;
use quince_core::{CategoryId, ProductId, ProductStatus, ReviewId, Role};

use crate::error::Result;
use crate::middleware::Caller;
use crate::routes::Paging;
use crate::state::AppState;
use crate::validate::{required_within, FieldErrors};

/// Create the product routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/featured", get(featured))
        .route("/low-stock", get(low_stock))
        .route("/sku/{sku}", get(get_by_sku))
        .route("/category/{category_id}", get(in_category))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
        .route("/{id}/stock", put(set_stock))
        .route("/{id}/status", put(set_status))
        .route("/{id}/featured", put(set_featured))
        .route("/{id}/reviews", post(add_review))
        .route("/{id}/reviews/{review_id}/approve", put(approve_review))
}

/// Image payload used on product creation.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Product creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock_quantity: u32,
    pub minimum_stock_level: Option<u32>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub images: Vec<ImageRequest>,
}

/// POST /api/v1/products
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;

    let mut errors = FieldErrors::new();
    errors.check(
        "name",
        required_within(&request.name, 255),
        "Product name is required",
    );
    errors.check("sku", required_within(&request.sku, 100), "SKU is required");
    errors.check(
        "price",
        request.price > Decimal::ZERO,
        "Price must be greater than 0",
    );
    errors.into_result()?;

    let product = state.catalog().create_product(CreateProduct {
        name: request.name,
        description: request.description,
        sku: request.sku,
        price: request.price,
        cost: request.cost,
        stock_quantity: request.stock_quantity,
        minimum_stock_level: request.minimum_stock_level,
        active: request.active,
        featured: request.featured,
        status: request.status,
        weight: request.weight,
        weight_unit: request.weight_unit,
        dimensions: request.dimensions,
        brand: request.brand,
        model: request.model,
        color: request.color,
        size: request.size,
        category_id: request.category_id,
        images: request
            .images
            .into_iter()
            .map(|image| ProductImage {
                url: image.url,
                alt_text: image.alt_text,
                is_primary: image.is_primary,
                sort_order: image.sort_order,
                active: true,
            })
            .collect(),
    })?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/v1/products
async fn list(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<Product>>> {
    Ok(Json(state.catalog().list_products(paging.request())))
}

/// Product search query parameters; filters combine with AND.
#[derive(Debug, Deserialize)]
pub struct ProductSearchParams {
    pub q: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub brand: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// GET /api/v1/products/search
async fn search(
    State(state): State<AppState>,
    Query(params): Query<ProductSearchParams>,
) -> Result<Json<Page<Product>>> {
    let paging = Paging {
        page: params.page,
        per_page: params.per_page,
    };
    let search = ProductSearch {
        query: params.q,
        category_id: params.category_id,
        min_price: params.min_price,
        max_price: params.max_price,
        brand: params.brand,
        featured_only: params.featured,
    };
    Ok(Json(
        state.catalog().search_products(&search, paging.request()),
    ))
}

/// GET /api/v1/products/featured
async fn featured(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<Product>>> {
    Ok(Json(state.catalog().featured_products(paging.request())))
}

/// GET /api/v1/products/low-stock
async fn low_stock(
    State(state): State<AppState>,
    caller: Caller,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<Product>>> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;
    Ok(Json(state.catalog().low_stock_products(paging.request())))
}

/// GET /api/v1/products/sku/{sku}
async fn get_by_sku(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().get_product_by_sku(&sku)?))
}

/// GET /api/v1/products/category/{category_id}
async fn in_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
    Query(paging): Query<Paging>,
) -> Result<Json<Page<Product>>> {
    Ok(Json(
        state
            .catalog()
            .products_in_category(category_id, paging.request())?,
    ))
}

/// GET /api/v1/products/{id}
///
/// Fetching a product records a view.
async fn get_by_id(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    let catalog = state.catalog();
    catalog.record_view(id)?;
    Ok(Json(catalog.get_product(id)?))
}

/// Product update request body; only supplied fields change.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub minimum_stock_level: Option<u32>,
    pub status: Option<ProductStatus>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// PUT /api/v1/products/{id}
async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;

    let product = state.catalog().update_product(
        id,
        UpdateProduct {
            name: request.name,
            description: request.description,
            price: request.price,
            cost: request.cost,
            minimum_stock_level: request.minimum_stock_level,
            status: request.status,
            weight: request.weight,
            weight_unit: request.weight_unit,
            dimensions: request.dimensions,
            brand: request.brand,
            model: request.model,
            color: request.color,
            size: request.size,
            category_id: request.category_id,
        },
    )?;
    Ok(Json(product))
}

/// DELETE /api/v1/products/{id}
async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    caller.require_any(&[Role::Admin])?;
    state.catalog().delete_product(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stock update request body: an absolute quantity, not a delta.
#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub quantity: u32,
}

/// PUT /api/v1/products/{id}/stock
async fn set_stock(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ProductId>,
    Json(request): Json<SetStockRequest>,
) -> Result<Json<Product>> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;
    Ok(Json(state.catalog().update_stock(id, request.quantity)?))
}

/// Active toggle request body.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// PUT /api/v1/products/{id}/status
async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ProductId>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<Product>> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;
    Ok(Json(state.catalog().set_product_active(id, request.active)?))
}

/// Featured toggle request body.
#[derive(Debug, Deserialize)]
pub struct SetFeaturedRequest {
    pub featured: bool,
}

/// PUT /api/v1/products/{id}/featured
async fn set_featured(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ProductId>,
    Json(request): Json<SetFeaturedRequest>,
) -> Result<Json<Product>> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;
    Ok(Json(
        state.catalog().set_product_featured(id, request.featured)?,
    ))
}

/// Review submission request body.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// POST /api/v1/products/{id}/reviews
async fn add_review(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<ProductId>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state.catalog().add_review(
        id,
        CreateReview {
            user_id: caller.user_id,
            rating: request.rating,
            title: request.title,
            comment: request.comment,
        },
    )?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /api/v1/products/{id}/reviews/{review_id}/approve
async fn approve_review(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, review_id)): Path<(ProductId, ReviewId)>,
) -> Result<Json<Review>> {
    caller.require_any(&[Role::Admin, Role::Manager])?;
    Ok(Json(state.catalog().approve_review(id, review_id)?))
}
