//! Slider repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{Slider, SliderFields},
};

#[derive(Clone)]
pub struct SliderRepository {
    pool: PgPool,
}

impl SliderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, fields: &SliderFields, created_by: Option<Uuid>) -> ApiResult<Slider> {
        let slider = sqlx::query_as::<_, Slider>(
            r#"
            INSERT INTO sliders (title, image, link, position, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, image, link, position, created_by, created_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.image)
        .bind(&fields.link)
        .bind(fields.position)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(slider)
    }

    /// Sliders in display order
    pub async fn list(&self) -> ApiResult<Vec<Slider>> {
        let sliders = sqlx::query_as::<_, Slider>(
            r#"
            SELECT id, title, image, link, position, created_by, created_at
            FROM sliders
            ORDER BY position ASC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sliders)
    }

    pub async fn update(&self, id: Uuid, fields: &SliderFields) -> ApiResult<Option<Slider>> {
        let slider = sqlx::query_as::<_, Slider>(
            r#"
            UPDATE sliders
            SET title = $2, image = $3, link = $4, position = $5
            WHERE id = $1
            RETURNING id, title, image, link, position, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.image)
        .bind(&fields.link)
        .bind(fields.position)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slider)
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM sliders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
