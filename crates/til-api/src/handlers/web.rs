//! Website handlers: server-rendered pages, form posts, session login,
//! and Google OAuth.
//!
//! The create and edit forms carry repeated `categories` fields; their
//! non-empty values form the desired set handed to the category reconciler.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::Form;
use base64::Engine;
use rand::RngCore;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use til_api::pages;
use til_core::{
    AcronymRepository, CategoryRepository, CreateAcronymRequest, CreateUserRequest,
    TokenRepository, UserRepository,
};

use crate::auth::{
    BasicCredentials, MaybeSessionUser, SessionUser, OAUTH_STATE_COOKIE, SESSION_COOKIE,
};
use crate::error::ApiError;
use crate::handlers::users::verify_password;
use crate::AppState;

// =============================================================================
// FORMS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Create/edit form payload. Browsers submit one `categories` field per
/// input, including blanks, which are dropped before reconciliation.
#[derive(Debug, Deserialize)]
pub struct AcronymForm {
    pub short: String,
    pub long: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl AcronymForm {
    /// The desired category-name set: non-empty trimmed inputs.
    pub fn desired_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

// =============================================================================
// COOKIES
// =============================================================================

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

fn oauth_state_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

fn expired(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::from(name);
    cookie.set_path("/");
    cookie
}

// =============================================================================
// PAGES
// =============================================================================

/// `GET /`: all acronyms.
pub async fn index(
    State(state): State<AppState>,
    MaybeSessionUser(user): MaybeSessionUser,
) -> Result<Html<String>, ApiError> {
    let acronyms = state.db.acronyms.list().await?;
    Ok(Html(pages::index(&acronyms, user.is_some())))
}

/// `GET /acronyms/:id`: one acronym with owner and categories.
pub async fn acronym_page(
    State(state): State<AppState>,
    MaybeSessionUser(session): MaybeSessionUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let acronym = state
        .db
        .acronyms
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::AcronymNotFound(id))?;
    let owner = state
        .db
        .users
        .find_by_id(acronym.user_id)
        .await?
        .ok_or(til_core::Error::UserNotFound(acronym.user_id))?;
    let categories = state.db.categories.list_for_acronym(id).await?;

    Ok(Html(pages::acronym_detail(
        &acronym,
        &owner.to_public(),
        &categories,
        session.is_some(),
    )))
}

/// `GET /users/:id`: one user and their acronyms.
pub async fn user_page(
    State(state): State<AppState>,
    MaybeSessionUser(session): MaybeSessionUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let user = state
        .db
        .users
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::UserNotFound(id))?;
    let acronyms = state.db.acronyms.list_for_user(id).await?;
    Ok(Html(pages::user_detail(
        &user.to_public(),
        &acronyms,
        session.is_some(),
    )))
}

/// `GET /users`: all users.
pub async fn all_users_page(
    State(state): State<AppState>,
    MaybeSessionUser(session): MaybeSessionUser,
) -> Result<Html<String>, ApiError> {
    let users = state.db.users.list().await?;
    let public: Vec<_> = users.iter().map(|u| u.to_public()).collect();
    Ok(Html(pages::all_users(&public, session.is_some())))
}

/// `GET /categories`: all categories.
pub async fn all_categories_page(
    State(state): State<AppState>,
    MaybeSessionUser(session): MaybeSessionUser,
) -> Result<Html<String>, ApiError> {
    let categories = state.db.categories.list().await?;
    Ok(Html(pages::all_categories(&categories, session.is_some())))
}

/// `GET /categories/:id`: one category and its acronyms.
pub async fn category_page(
    State(state): State<AppState>,
    MaybeSessionUser(session): MaybeSessionUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let category = state
        .db
        .categories
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::CategoryNotFound(id))?;
    let acronyms = state.db.categories.list_acronyms(id).await?;
    Ok(Html(pages::category_detail(
        &category,
        &acronyms,
        session.is_some(),
    )))
}

// =============================================================================
// SESSION LOGIN
// =============================================================================

/// `GET /login`: login form.
pub async fn login_form(State(state): State<AppState>) -> Html<String> {
    Html(pages::login(None, state.google.is_some()))
}

/// `POST /login`: verify the password and open a session.
///
/// Failure renders the form again with a message; the handler returns a
/// value either way, no redirect-by-exception.
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let credentials = BasicCredentials {
        username: form.username,
        password: form.password,
    };

    let user = match verify_password(&state, &credentials).await {
        Ok(user) => user,
        Err(ApiError::Unauthorized(_)) => {
            return Ok(Html(pages::login(
                Some("Invalid username or password"),
                state.google.is_some(),
            ))
            .into_response());
        }
        Err(other) => return Err(other),
    };

    let token = state.db.tokens.generate(user.id).await?;
    let jar = jar.add(session_cookie(token.value, state.cookie_secure));
    Ok((jar, Redirect::to("/")).into_response())
}

/// `POST /logout`: revoke the session token and drop the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.db.tokens.revoke(cookie.value()).await?;
    }
    let jar = jar.remove(expired(SESSION_COOKIE));
    Ok((jar, Redirect::to("/")).into_response())
}

/// `GET /register`: registration form.
pub async fn register_form() -> Html<String> {
    Html(pages::register(None))
}

/// `POST /register`: create the user and log them straight in.
pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    if form.password.is_empty() {
        return Ok(Html(pages::register(Some("Password cannot be empty"))).into_response());
    }

    let password_hash = bcrypt::hash(&form.password, bcrypt::DEFAULT_COST)
        .map_err(|e| til_core::Error::Internal(format!("Password hashing failed: {}", e)))?;

    let req = CreateUserRequest {
        name: form.name,
        username: form.username,
        password: String::new(),
        email: form.email,
        profile_picture: None,
    };

    let user = match state.db.users.create(req, &password_hash).await {
        Ok(user) => user,
        Err(err) => match ApiError::from(err) {
            ApiError::Conflict(msg) | ApiError::BadRequest(msg) => {
                return Ok(Html(pages::register(Some(&msg))).into_response());
            }
            other => return Err(other),
        },
    };

    let token = state.db.tokens.generate(user.id).await?;
    let jar = jar.add(session_cookie(token.value, state.cookie_secure));
    Ok((jar, Redirect::to("/")).into_response())
}

// =============================================================================
// ACRONYM FORMS (reconciler consumers)
// =============================================================================

/// `GET /acronyms/create`: empty form.
pub async fn create_acronym_form(SessionUser(_user): SessionUser) -> Html<String> {
    Html(pages::acronym_form(None, &[]))
}

/// `POST /acronyms/create`: insert the acronym, then reconcile its
/// categories against the submitted names.
pub async fn create_acronym_submit(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Form(form): Form<AcronymForm>,
) -> Result<Redirect, ApiError> {
    let desired = form.desired_categories();
    let acronym = state
        .db
        .acronyms
        .create(
            CreateAcronymRequest {
                short: form.short,
                long: form.long,
            },
            user.id,
        )
        .await?;

    state.reconciler.reconcile(acronym.id, &desired).await?;

    Ok(Redirect::to(&format!("/acronyms/{}", acronym.id)))
}

/// `GET /acronyms/:id/edit`: form pre-filled with current values and
/// attached category names.
pub async fn edit_acronym_form(
    State(state): State<AppState>,
    SessionUser(_user): SessionUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let acronym = state
        .db
        .acronyms
        .find_by_id(id)
        .await?
        .ok_or(til_core::Error::AcronymNotFound(id))?;
    let categories = state.db.categories.list_for_acronym(id).await?;
    Ok(Html(pages::acronym_form(Some(&acronym), &categories)))
}

/// `POST /acronyms/:id/edit`: overwrite the fields, then converge the
/// association to the submitted names. An empty submission detaches
/// everything.
pub async fn edit_acronym_submit(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Path(id): Path<Uuid>,
    Form(form): Form<AcronymForm>,
) -> Result<Redirect, ApiError> {
    let desired = form.desired_categories();
    state
        .db
        .acronyms
        .update(
            id,
            CreateAcronymRequest {
                short: form.short,
                long: form.long,
            },
            user.id,
        )
        .await?;

    state.reconciler.reconcile(id, &desired).await?;

    Ok(Redirect::to(&format!("/acronyms/{}", id)))
}

/// `POST /acronyms/:id/delete`
pub async fn delete_acronym_submit(
    State(state): State<AppState>,
    SessionUser(_user): SessionUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    state.db.acronyms.delete(id).await?;
    Ok(Redirect::to("/"))
}

// =============================================================================
// GOOGLE LOGIN
// =============================================================================

fn random_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// `GET /login-google`: send the browser to the consent screen, pinning
/// the anti-forgery state in a cookie rather than ambient session state.
pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let google = state
        .google
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Google login is not configured".to_string()))?;

    let oauth_state = random_state();
    let url = google.auth_url(&oauth_state);
    let jar = jar.add(oauth_state_cookie(oauth_state, state.cookie_secure));
    Ok((jar, Redirect::to(&url)).into_response())
}

/// `GET /oauth/google/callback`: verify state, exchange the code, and log
/// the Google identity in, creating a local user on first sight.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Response, ApiError> {
    let google = state
        .google
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Google login is not configured".to_string()))?;

    let code = params
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;
    let returned_state = params
        .state
        .ok_or_else(|| ApiError::BadRequest("Missing state parameter".to_string()))?;
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Missing OAuth state cookie".to_string()))?;

    if returned_state != expected_state {
        return Err(ApiError::Unauthorized(
            "OAuth state mismatch".to_string(),
        ));
    }

    let access_token = google.exchange_code(&code).await?;
    let info = google.fetch_user(&access_token).await?;

    // Google identities key on email-as-username.
    let user = match state.db.users.find_by_username(&info.email).await? {
        Some(user) => user,
        None => {
            let user = state
                .db
                .users
                .create_google_user(&info.name, &info.email, &random_state())
                .await?;
            info!(
                subsystem = "auth",
                component = "google_oauth",
                op = "create_user",
                user_id = %user.id,
                "Created local user from Google identity"
            );
            user
        }
    };

    let token = state.db.tokens.generate(user.id).await?;
    let jar = jar
        .remove(expired(OAUTH_STATE_COOKIE))
        .add(session_cookie(token.value, state.cookie_secure));
    Ok((jar, Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_categories_drops_blanks_and_trims() {
        let form = AcronymForm {
            short: "OMG".to_string(),
            long: "Oh My God".to_string(),
            categories: vec![
                "Funny".to_string(),
                "  ".to_string(),
                String::new(),
                " Tech ".to_string(),
            ],
        };
        assert_eq!(form.desired_categories(), vec!["Funny", "Tech"]);
    }

    #[test]
    fn test_desired_categories_absent_field_is_empty_set() {
        let form: AcronymForm = serde_json::from_str(r#"{"short":"A","long":"B"}"#).unwrap();
        assert!(form.desired_categories().is_empty());
    }

    #[test]
    fn test_random_state_is_url_safe_and_unique() {
        let a = random_state();
        let b = random_state();
        assert_ne!(a, b);
        assert!(!a.contains('+') && !a.contains('/') && !a.contains('='));
    }
}
