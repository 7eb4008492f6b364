//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use til_core::{CreateUserRequest, Error, Result, User, UserRepository};

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> User {
        User {
            id: row.get("id"),
            name: row.get("name"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            email: row.get("email"),
            profile_picture: row.get("profile_picture"),
            google_identity: row.get("google_identity"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: CreateUserRequest, password_hash: &str) -> Result<User> {
        if req.username.trim().is_empty() {
            return Err(Error::InvalidInput("Username cannot be empty".to_string()));
        }
        if req.name.trim().is_empty() {
            return Err(Error::InvalidInput("Name cannot be empty".to_string()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, name, username, password_hash, email, profile_picture, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, username, password_hash, email, profile_picture,
                      google_identity, created_at
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.username)
        .bind(password_hash)
        .bind(&req.email)
        .bind(&req.profile_picture)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::map_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, username, password_hash, email, profile_picture,
                   google_identity, created_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, username, password_hash, email, profile_picture,
                   google_identity, created_at
            FROM users WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, username, password_hash, email, profile_picture,
                   google_identity, created_at
            FROM users ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }
}

impl PgUserRepository {
    /// Insert a user created through Google login.
    ///
    /// Google accounts carry no usable password; the stored hash is a fresh
    /// random value that can never verify, so password login stays closed
    /// for them.
    pub async fn create_google_user(
        &self,
        name: &str,
        email: &str,
        unusable_password_hash: &str,
    ) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO users (id, name, username, password_hash, email, google_identity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, username, password_hash, email, profile_picture,
                      google_identity, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(unusable_password_hash)
        .bind(email)
        .bind("google")
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::map_row(&row))
    }

    /// Insert the bootstrap admin user if no user with that username exists.
    ///
    /// Returns true when a row was inserted.
    pub async fn seed_admin(&self, username: &str, password_hash: &str) -> Result<bool> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, username, password_hash, email, created_at)
            VALUES ($1, 'Admin', $2, $3, $4, $5)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(format!("{}@localhost.local", username))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
