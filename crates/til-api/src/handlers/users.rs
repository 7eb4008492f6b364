//! User JSON API handlers, including login.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use til_core::{
    Acronym, AcronymRepository, CreateUserRequest, PublicUser, Token, TokenRepository,
    UserRepository,
};

use crate::auth::{ApiUser, BasicCredentials};
use crate::error::ApiError;
use crate::AppState;

/// List all users, public projection.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.db.users.list().await?;
    Ok(Json(users.iter().map(|u| u.to_public()).collect()))
}

/// Get a user by ID, public projection.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .db
        .users
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::UserNotFound(id))?;
    Ok(Json(user.to_public()))
}

/// List the acronyms owned by a user.
pub async fn get_user_acronyms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Acronym>>, ApiError> {
    state
        .db
        .users
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::UserNotFound(id))?;
    Ok(Json(state.db.acronyms.list_for_user(id).await?))
}

/// Register a new user. Requires an authenticated caller; the plaintext
/// password is bcrypt-hashed before it reaches the store.
pub async fn create_user(
    State(state): State<AppState>,
    ApiUser(_creator): ApiUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password cannot be empty".to_string()));
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| til_core::Error::Internal(format!("Password hashing failed: {}", e)))?;

    let user = state.db.users.create(req, &password_hash).await?;
    info!(
        subsystem = "api",
        op = "create_user",
        user_id = %user.id,
        "Registered user"
    );
    Ok((StatusCode::CREATED, Json(user.to_public())))
}

/// Exchange HTTP Basic credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    credentials: BasicCredentials,
) -> Result<Json<Token>, ApiError> {
    let user = verify_password(&state, &credentials).await?;
    let token = state.db.tokens.generate(user.id).await?;
    info!(
        subsystem = "auth",
        op = "login",
        user_id = %user.id,
        "Issued API token"
    );
    Ok(Json(token))
}

/// Resolve Basic credentials to a user, or Unauthorized.
///
/// Google-created accounts carry an unusable hash, so bcrypt verification
/// fails for them and password login stays closed.
pub(crate) async fn verify_password(
    state: &AppState,
    credentials: &BasicCredentials,
) -> Result<til_core::User, ApiError> {
    let user = state
        .db
        .users
        .find_by_username(&credentials.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let verified = bcrypt::verify(&credentials.password, &user.password_hash).unwrap_or(false);
    if !verified {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }
    Ok(user)
}
