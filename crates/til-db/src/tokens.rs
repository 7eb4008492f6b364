//! Bearer token repository implementation.

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use til_core::{Error, Result, Token, TokenRepository, User};

/// PostgreSQL implementation of TokenRepository.
#[derive(Clone)]
pub struct PgTokenRepository {
    pool: Pool<Postgres>,
}

impl PgTokenRepository {
    /// Create a new PgTokenRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Mint an opaque token value: 16 random bytes, base64-encoded.
    fn random_value() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn generate(&self, user_id: Uuid) -> Result<Token> {
        let id = Uuid::new_v4();
        let value = Self::random_value();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO tokens (id, value, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, value, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(&value)
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Token {
            id: row.get("id"),
            value: row.get("value"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
        })
    }

    async fn find_user_by_value(&self, value: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.name, u.username, u.password_hash, u.email,
                   u.profile_picture, u.google_identity, u.created_at
            FROM users u
            JOIN tokens t ON t.user_id = u.id
            WHERE t.value = $1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            name: row.get("name"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            email: row.get("email"),
            profile_picture: row.get("profile_picture"),
            google_identity: row.get("google_identity"),
            created_at: row.get("created_at"),
        }))
    }

    async fn revoke(&self, value: &str) -> Result<()> {
        sqlx::query("DELETE FROM tokens WHERE value = $1")
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_value_length() {
        // 16 bytes base64-encode to 24 characters including padding.
        let value = PgTokenRepository::random_value();
        assert_eq!(value.len(), 24);
    }

    #[test]
    fn test_random_values_differ() {
        let a = PgTokenRepository::random_value();
        let b = PgTokenRepository::random_value();
        assert_ne!(a, b);
    }
}
