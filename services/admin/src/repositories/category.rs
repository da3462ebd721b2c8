//! Category repository for database operations

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{Category, CategoryFields},
    response::PageQuery,
};

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        fields: &CategoryFields,
        created_by: Option<Uuid>,
    ) -> ApiResult<Category> {
        info!("Creating category: {}", fields.name);

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, image, color, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, image, color, created_by, created_at
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.image)
        .bind(&fields.color)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn update(&self, id: Uuid, fields: &CategoryFields) -> ApiResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, image = $3, color = $4
            WHERE id = $1
            RETURNING id, name, image, color, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.image)
        .bind(&fields.color)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn exists(&self, id: Uuid) -> ApiResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn list(&self, page: &PageQuery) -> ApiResult<(Vec<Category>, i64)> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, image, color, created_by, created_at
            FROM categories
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok((categories, total))
    }

    /// Number of ledger entries tagged with a category
    pub async fn count_entries(&self, id: Uuid) -> ApiResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete a category only while no ledger entry references it
    pub async fn delete_if_unused(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM ledger_entries WHERE category_id = $1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
