//! Acronym JSON API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use til_core::{
    Acronym, AcronymRepository, Category, CategoryRepository, CreateAcronymRequest, PublicUser,
    UserRepository,
};

use crate::auth::ApiUser;
use crate::error::ApiError;
use crate::AppState;

/// Query parameters for acronym search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
}

/// List all acronyms.
pub async fn list_acronyms(State(state): State<AppState>) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.db.acronyms.list().await?))
}

/// Create an acronym owned by the authenticated user.
pub async fn create_acronym(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Json(req): Json<CreateAcronymRequest>,
) -> Result<(StatusCode, Json<Acronym>), ApiError> {
    let acronym = state.db.acronyms.create(req, user.id).await?;
    Ok((StatusCode::CREATED, Json(acronym)))
}

/// Get an acronym by ID.
pub async fn get_acronym(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Acronym>, ApiError> {
    let acronym = state
        .db
        .acronyms
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::AcronymNotFound(id))?;
    Ok(Json(acronym))
}

/// Full-field overwrite of an acronym; ownership transfers to the caller.
pub async fn update_acronym(
    State(state): State<AppState>,
    ApiUser(user): ApiUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateAcronymRequest>,
) -> Result<Json<Acronym>, ApiError> {
    let acronym = state.db.acronyms.update(id, req, user.id).await?;
    Ok(Json(acronym))
}

/// Delete an acronym. Association rows cascade away in the store.
pub async fn delete_acronym(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.db.acronyms.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exact-match search on short or long form.
pub async fn search_acronyms(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    let term = query
        .term
        .ok_or_else(|| ApiError::BadRequest("Missing search term".to_string()))?;
    Ok(Json(state.db.acronyms.search(&term).await?))
}

/// Get the first acronym.
pub async fn first_acronym(State(state): State<AppState>) -> Result<Json<Acronym>, ApiError> {
    let acronym = state
        .db
        .acronyms
        .first()
        .await?
        .ok_or_else(|| ApiError::NotFound("No acronyms exist yet".to_string()))?;
    Ok(Json(acronym))
}

/// List acronyms sorted ascending by short form.
pub async fn sorted_acronyms(
    State(state): State<AppState>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    Ok(Json(state.db.acronyms.list_sorted().await?))
}

/// Get the owning user of an acronym, public projection.
pub async fn get_acronym_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    let acronym = state
        .db
        .acronyms
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::AcronymNotFound(id))?;
    let user = state
        .db
        .users
        .find_by_id(acronym.user_id)
        .await?
        .ok_or(til_core::Error::UserNotFound(acronym.user_id))?;
    Ok(Json(user.to_public()))
}

/// Directly attach one existing category to an acronym.
///
/// This is the raw association endpoint; it does not go through the
/// reconciler and never creates categories.
pub async fn attach_category(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    Path((id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .acronyms
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::AcronymNotFound(id))?;
    state
        .db
        .categories
        .find_by_id(category_id)
        .await?
        .ok_or(til_core::Error::CategoryNotFound(category_id))?;

    state.db.categories.attach(id, category_id).await?;
    Ok(StatusCode::CREATED)
}

/// Directly detach a category from an acronym.
pub async fn detach_category(
    State(state): State<AppState>,
    ApiUser(_user): ApiUser,
    Path((id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .acronyms
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::AcronymNotFound(id))?;

    state.db.categories.detach(id, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the categories attached to an acronym.
pub async fn get_acronym_categories(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Category>>, ApiError> {
    state
        .db
        .acronyms
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::AcronymNotFound(id))?;
    Ok(Json(state.db.categories.list_for_acronym(id).await?))
}
