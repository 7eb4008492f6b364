//! Category repository implementation, including the acronym-category
//! association table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use til_core::{
    validate_category_name, Acronym, Category, CategoryRepository, Error, Result,
};

/// PostgreSQL implementation of CategoryRepository.
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> Category {
        Category {
            id: row.get("id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
        }
    }

    fn map_acronym_row(row: &sqlx::postgres::PgRow) -> Acronym {
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
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category> {
        validate_category_name(name).map_err(Error::InvalidInput)?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO categories (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Self::map_row(&row))
    }

    async fn ensure(&self, name: &str) -> Result<Category> {
        validate_category_name(name).map_err(Error::InvalidInput)?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        // Two concurrent requests racing on the same new name both pass
        // through here; the unique constraint makes one insert win and the
        // re-select below returns the surviving row to both.
        sqlx::query(
            "INSERT INTO categories (id, name, created_at) VALUES ($1, $2, $3)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(id)
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(Self::map_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        // Exact, case-sensitive match: "Funny" and "funny" are distinct tags.
        let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn list_for_acronym(&self, acronym_id: Uuid) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.created_at
            FROM categories c
            JOIN acronym_category ac ON ac.category_id = c.id
            WHERE ac.acronym_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(acronym_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_row).collect())
    }

    async fn list_acronyms(&self, category_id: Uuid) -> Result<Vec<Acronym>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.short, a.long, a.user_id, a.created_at
            FROM acronyms a
            JOIN acronym_category ac ON ac.acronym_id = a.id
            WHERE ac.category_id = $1
            ORDER BY a.short
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::map_acronym_row).collect())
    }

    async fn attach(&self, acronym_id: Uuid, category_id: Uuid) -> Result<()> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO acronym_category (id, acronym_id, category_id) VALUES ($1, $2, $3)
             ON CONFLICT (acronym_id, category_id) DO NOTHING",
        )
        .bind(id)
        .bind(acronym_id)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn detach(&self, acronym_id: Uuid, category_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM acronym_category WHERE acronym_id = $1 AND category_id = $2")
            .bind(acronym_id)
            .bind(category_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
