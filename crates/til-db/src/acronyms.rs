//! Acronym repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use til_core::{
    validate_acronym, Acronym, AcronymRepository, CreateAcronymRequest, Error, Result,
};

/// PostgreSQL implementation of AcronymRepository.
#[derive(Clone)]
pub struct PgAcronymRepository {
    pool: Pool<Postgres>,
}

impl PgAcronymRepository {
    /// Create a new PgAcronymRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Acronym {
        Acronym {
            id: row.get("id"),
            short: row.get("short"),
            long: row.get("long"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl AcronymRepository for PgAcronymRepository {
    async fn create(&self, req: CreateAcronymRequest, user_id: Uuid) -> Result<Acronym> {
        validate_acronym(&req).map_err(Error::InvalidInput)?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO acronyms (id, short, long, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, short, long, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(&req.short)
        .bind(&req.long)
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::map_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Acronym>> {
        let row = sqlx::query(
            "SELECT id, short, long, user_id, created_at FROM acronyms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list(&self) -> Result<Vec<Acronym>> {
        let rows = sqlx::query(
            "SELECT id, short, long, user_id, created_at FROM acronyms ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn list_sorted(&self) -> Result<Vec<Acronym>> {
        let rows = sqlx::query(
            "SELECT id, short, long, user_id, created_at FROM acronyms ORDER BY short ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn first(&self) -> Result<Option<Acronym>> {
        let row = sqlx::query(
            "SELECT id, short, long, user_id, created_at FROM acronyms ORDER BY created_at LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn search(&self, term: &str) -> Result<Vec<Acronym>> {
        let rows = sqlx::query(
            r#"
            SELECT id, short, long, user_id, created_at
            FROM acronyms
            WHERE short = $1 OR long = $1
            ORDER BY created_at
            "#,
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn update(&self, id: Uuid, req: CreateAcronymRequest, user_id: Uuid) -> Result<Acronym> {
        validate_acronym(&req).map_err(Error::InvalidInput)?;

        let row = sqlx::query(
            r#"
            UPDATE acronyms SET short = $2, long = $3, user_id = $4
            WHERE id = $1
            RETURNING id, short, long, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(&req.short)
        .bind(&req.long)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => Ok(Self::map_row(&row)),
            None => Err(Error::AcronymNotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM acronyms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::AcronymNotFound(id));
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Acronym>> {
        let rows = sqlx::query(
            r#"
            SELECT id, short, long, user_id, created_at
            FROM acronyms WHERE user_id = $1 ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }
}
