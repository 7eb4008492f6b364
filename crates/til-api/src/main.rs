//! TIL API server.
//!
//! Serves the JSON API under `/api` and the server-rendered website at the
//! root, backed by PostgreSQL through `til_db::Database`.

mod auth;
mod error;
mod handlers;

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use til_api::services::{CategoryReconciler, GoogleOAuth};
use til_db::{log_pool_metrics, Database, PoolConfig};

use handlers::{acronyms, categories, users, web};

/// Shared application state.
#[derive(Clone)]
struct AppState {
    db: Database,
    reconciler: CategoryReconciler,
    google: Option<GoogleOAuth>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
    cookie_secure: bool,
}

/// Request ID generator using UUIDv7 for time-ordered IDs.
#[derive(Clone)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Pool sizing from `DATABASE_MAX_CONNECTIONS` / `DATABASE_MIN_CONNECTIONS`,
/// keeping the pool defaults for absent or unparsable values.
fn pool_config_from_env() -> PoolConfig {
    let mut config = PoolConfig::new();
    if let Some(max) = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config = config.max_connections(max);
    }
    if let Some(min) = std::env::var("DATABASE_MIN_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config = config.min_connections(min);
    }
    config
}

/// Build the limiter quota. Zero values would make the quota
/// unconstructible, so they fall back to the defaults instead.
fn rate_limit_quota(requests: u32, period_secs: u64) -> Quota {
    let burst =
        NonZeroU32::new(requests).unwrap_or_else(|| NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN));
    let period_secs = if period_secs == 0 { 60 } else { period_secs };
    Quota::with_period(Duration::from_secs(period_secs))
        .unwrap_or_else(|| Quota::per_minute(burst))
        .allow_burst(burst)
}

/// Parse allowed origins from comma-separated environment variable.
///
/// # Environment Variable
/// `ALLOWED_ORIGINS` - Comma-separated list of allowed origins
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8080,http://localhost:3000".to_string());

    if origins_str.trim().is_empty() {
        return vec![
            HeaderValue::from_static("http://localhost:8080"),
            HeaderValue::from_static("http://localhost:3000"),
        ];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "til_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "til_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("til-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/til".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    // Rate limiting configuration
    // RATE_LIMIT_REQUESTS: requests per period (default: 100)
    // RATE_LIMIT_PERIOD_SECS: period in seconds (default: 60 = 1 minute)
    let rate_limit_requests: u64 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    // Session cookies default to Secure outside local development
    let cookie_secure: bool = std::env::var("COOKIE_SECURE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect_with_config(&database_url, pool_config_from_env()).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Seed the admin account so a fresh install has an authenticated user
    // able to create others
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "password".to_string());
    let admin_hash = bcrypt::hash(&admin_password, bcrypt::DEFAULT_COST)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
    if db.users.seed_admin("admin", &admin_hash).await? {
        info!("Seeded admin user");
    }

    // Google OAuth is optional; without credentials the routes 404
    let google = GoogleOAuth::from_env();
    info!(
        "Google login: {}",
        if google.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );

    // Periodic pool health logging
    let metrics_pool = db.pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            log_pool_metrics(&metrics_pool);
        }
    });

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let quota = rate_limit_quota(rate_limit_requests as u32, rate_limit_period_secs);
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };

    // Create app state
    let reconciler = CategoryReconciler::new(db.clone());
    let state = AppState {
        db,
        reconciler,
        google,
        rate_limiter,
        cookie_secure,
    };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Acronym API
        .route(
            "/api/acronyms",
            get(acronyms::list_acronyms).post(acronyms::create_acronym),
        )
        .route("/api/acronyms/search", get(acronyms::search_acronyms))
        .route("/api/acronyms/first", get(acronyms::first_acronym))
        .route("/api/acronyms/sorted", get(acronyms::sorted_acronyms))
        .route(
            "/api/acronyms/:id",
            get(acronyms::get_acronym)
                .put(acronyms::update_acronym)
                .delete(acronyms::delete_acronym),
        )
        .route("/api/acronyms/:id/user", get(acronyms::get_acronym_user))
        .route(
            "/api/acronyms/:id/categories",
            get(acronyms::get_acronym_categories),
        )
        .route(
            "/api/acronyms/:id/categories/:category_id",
            post(acronyms::attach_category).delete(acronyms::detach_category),
        )
        // User API
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/login", post(users::login))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/acronyms", get(users::get_user_acronyms))
        // Category API
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/api/categories/:id", get(categories::get_category))
        .route(
            "/api/categories/:id/acronyms",
            get(categories::get_category_acronyms),
        )
        // Website
        .route("/", get(web::index))
        .route(
            "/acronyms/create",
            get(web::create_acronym_form).post(web::create_acronym_submit),
        )
        .route("/acronyms/:id", get(web::acronym_page))
        .route(
            "/acronyms/:id/edit",
            get(web::edit_acronym_form).post(web::edit_acronym_submit),
        )
        .route("/acronyms/:id/delete", post(web::delete_acronym_submit))
        .route("/users", get(web::all_users_page))
        .route("/users/:id", get(web::user_page))
        .route("/categories", get(web::all_categories_page))
        .route("/categories/:id", get(web::category_page))
        .route("/login", get(web::login_form).post(web::login_submit))
        .route("/logout", post(web::logout))
        .route(
            "/register",
            get(web::register_form).post(web::register_submit),
        )
        .route("/login-google", get(web::google_login))
        .route("/oauth/google/callback", get(web::google_callback))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        // Form posts and JSON bodies are small; 1MB is ample
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// RATE LIMITING MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_quota_zero_values_fall_back_to_defaults() {
        let quota = rate_limit_quota(0, 0);
        assert_eq!(quota.burst_size().get(), 100);
        assert_eq!(quota.replenish_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_rate_limit_quota_uses_configured_values() {
        let quota = rate_limit_quota(5, 10);
        assert_eq!(quota.burst_size().get(), 5);
        assert_eq!(quota.replenish_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_pool_config_from_env() {
        std::env::remove_var("DATABASE_MAX_CONNECTIONS");
        std::env::remove_var("DATABASE_MIN_CONNECTIONS");
        let config = pool_config_from_env();
        assert_eq!(config.max_connections, til_db::pool::DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, 1);

        std::env::set_var("DATABASE_MAX_CONNECTIONS", "25");
        std::env::set_var("DATABASE_MIN_CONNECTIONS", "4");
        let config = pool_config_from_env();
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.min_connections, 4);

        std::env::remove_var("DATABASE_MAX_CONNECTIONS");
        std::env::remove_var("DATABASE_MIN_CONNECTIONS");
    }
}
