//! Category route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use quince_commerce::models::Category;
use quince_commerce::services::{CreateCategory, UpdateCategory};
use quince_core::{CategoryId, Role};

use crate::error::Result;
use crate::middleware::Caller;
use crate::state::AppState;
use crate::validate::{required_within, FieldErrors};

/// Create the category routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roots).post(create))
        .route("/slug/{slug}", get(get_by_slug))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
        .route("/{id}/children", get(children))
}

/// Category creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
    pub parent_id: Option<CategoryId>,
}

/// POST /api/v1/categories
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;

    let mut errors = FieldErrors::new();
    errors.check(
        "name",
        required_within(&request.name, 100),
        "Category name is required",
    );
    errors.check("slug", required_within(&request.slug, 100), "Slug is required");
    errors.into_result()?;

    let category = state.catalog().create_category(CreateCategory {
        name: request.name,
        description: request.description,
        slug: request.slug,
        image_url: request.image_url,
        sort_order: request.sort_order,
        parent_id: request.parent_id,
    })?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories
async fn list_roots(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().root_categories()))
}

/// GET /api/v1/categories/slug/{slug}
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>> {
    Ok(Json(state.catalog().get_category_by_slug(&slug)?))
}

/// GET /api/v1/categories/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    Ok(Json(state.catalog().get_category(id)?))
}

/// GET /api/v1/categories/{id}/children
async fn children(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().subcategories(id)?))
}

/// Category update request body; only supplied fields change.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// PUT /api/v1/categories/{id}
async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<CategoryId>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    caller.require_any(&[Role::Admin, Role::InventoryManager])?;

    let category = state.catalog().update_category(
        id,
        UpdateCategory {
            name: request.name,
            description: request.description,
            slug: request.slug,
            image_url: request.image_url,
            active: request.active,
            sort_order: request.sort_order,
        },
    )?;
    Ok(Json(category))
}

/// DELETE /api/v1/categories/{id}
async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    caller.require_any(&[Role::Admin])?;
    state.catalog().delete_category(id)?;
    Ok(StatusCode::NO_CONTENT)
}
