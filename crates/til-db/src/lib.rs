//! # til-db
//!
//! PostgreSQL database layer for TIL.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, acronyms, categories, and tokens
//! - Embedded SQL migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use til_db::Database;
//! use til_core::{AcronymRepository, CreateAcronymRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/til").await?;
//!
//!     let acronym = db.acronyms.create(CreateAcronymRequest {
//!         short: "OMG".to_string(),
//!         long: "Oh My God".to_string(),
//!     }, user_id).await?;
//!
//!     println!("Created acronym: {}", acronym.id);
//!     Ok(())
//! }
//! ```

pub mod acronyms;
pub mod categories;
pub mod pool;
pub mod tokens;
pub mod users;

// Test fixtures for integration tests
// Note: always compiled so integration tests (in tests/) can use
// DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use til_core::*;

// Re-export repository implementations
pub use acronyms::PgAcronymRepository;
pub use categories::PgCategoryRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use tokens::PgTokenRepository;
pub use users::PgUserRepository;

/// Aggregate handle over all repositories, sharing one connection pool.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User repository.
    pub users: PgUserRepository,
    /// Acronym repository.
    pub acronyms: PgAcronymRepository,
    /// Category and association repository.
    pub categories: PgCategoryRepository,
    /// Bearer token repository.
    pub tokens: PgTokenRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            acronyms: PgAcronymRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            tokens: PgTokenRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
