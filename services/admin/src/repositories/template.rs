//! Message template repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{Template, TemplateFields},
};

const TEMPLATE_FIELDS: &str = "id, name, subject, body, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        fields: &TemplateFields,
        created_by: Option<Uuid>,
    ) -> ApiResult<Template> {
        let template = sqlx::query_as::<_, Template>(&format!(
            r#"
            INSERT INTO templates (name, subject, body, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TEMPLATE_FIELDS
        ))
        .bind(&fields.name)
        .bind(&fields.subject)
        .bind(&fields.body)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn list(&self) -> ApiResult<Vec<Template>> {
        let templates = sqlx::query_as::<_, Template>(&format!(
            "SELECT {} FROM templates ORDER BY name ASC",
            TEMPLATE_FIELDS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Template>> {
        let template = sqlx::query_as::<_, Template>(&format!(
            "SELECT {} FROM templates WHERE id = $1",
            TEMPLATE_FIELDS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn find_by_name(&self, name: &str) -> ApiResult<Option<Template>> {
        let template = sqlx::query_as::<_, Template>(&format!(
            "SELECT {} FROM templates WHERE name = $1",
            TEMPLATE_FIELDS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn update(&self, id: Uuid, fields: &TemplateFields) -> ApiResult<Option<Template>> {
        let template = sqlx::query_as::<_, Template>(&format!(
            r#"
            UPDATE templates
            SET name = $2, subject = $3, body = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TEMPLATE_FIELDS
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.subject)
        .bind(&fields.body)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
