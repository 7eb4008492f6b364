//! Category JSON API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use til_core::{Acronym, Category, CategoryRepository, CreateCategoryRequest};

use crate::auth::ApiUser;
use crate::error::ApiError;
use crate::AppState;

/// List all categories.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories.list().await?))
}

/// Create a category. Duplicate names yield 409.
pub async fn create_category(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.db.categories.create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a category by ID.
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .db
        .categories
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::CategoryNotFound(id))?;
    Ok(Json(category))
}

/// List the acronyms attached to a category.
pub async fn get_category_acronyms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    state
        .db
        .categories
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::CategoryNotFound(id))?;
    Ok(Json(state.db.categories.list_acronyms(id).await?))
}
