//! Level repository for database operations

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{Level, LevelFields},
};

/// Level repository
#[derive(Clone)]
pub struct LevelRepository {
    pool: PgPool,
}

impl LevelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a level; names and values are not required to be unique
    pub async fn create(&self, fields: &LevelFields, created_by: Option<Uuid>) -> ApiResult<Level> {
        info!("Creating level: {}", fields.name);

        let level = sqlx::query_as::<_, Level>(
            r#"
            INSERT INTO levels (name, level_value, min_thresh, max_thresh, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, level_value, min_thresh, max_thresh, created_by, created_at
            "#,
        )
        .bind(&fields.name)
        .bind(fields.level_value)
        .bind(fields.min_thresh)
        .bind(fields.max_thresh)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(level)
    }

    /// Overwrite every mutable field; `None` when the level does not exist
    pub async fn update(&self, id: Uuid, fields: &LevelFields) -> ApiResult<Option<Level>> {
        let level = sqlx::query_as::<_, Level>(
            r#"
            UPDATE levels
            SET name = $2, level_value = $3, min_thresh = $4, max_thresh = $5
            WHERE id = $1
            RETURNING id, name, level_value, min_thresh, max_thresh, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.level_value)
        .bind(fields.min_thresh)
        .bind(fields.max_thresh)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Level>> {
        let level = sqlx::query_as::<_, Level>(
            r#"
            SELECT id, name, level_value, min_thresh, max_thresh, created_by, created_at
            FROM levels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// All levels ordered by their numeric value
    pub async fn list(&self) -> ApiResult<Vec<Level>> {
        let levels = sqlx::query_as::<_, Level>(
            r#"
            SELECT id, name, level_value, min_thresh, max_thresh, created_by, created_at
            FROM levels
            ORDER BY level_value ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    pub async fn exists(&self, id: Uuid) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM levels WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Number of users referencing a level
    pub async fn count_users(&self, id: Uuid) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE level_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a level only while no user references it
    ///
    /// The association check and the delete are one statement; the
    /// `ON DELETE RESTRICT` foreign key covers users inserted concurrently.
    pub async fn delete_if_unused(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM levels
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM users WHERE level_id = $1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
