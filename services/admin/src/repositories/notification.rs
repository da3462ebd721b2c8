//! Notification repository

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{NewNotification, Notification},
    response::PageQuery,
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        notification: &NewNotification,
        created_by: Option<Uuid>,
    ) -> ApiResult<Notification> {
        info!(
            "Creating notification for {}",
            notification
                .user_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "all users".to_string())
        );

        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (title, body, user_id, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, body, user_id, created_by, created_at
            "#,
        )
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.user_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Every notification, newest first
    pub async fn list_all(&self, page: &PageQuery) -> ApiResult<(Vec<Notification>, i64)> {
        let items = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, title, body, user_id, created_by, created_at
            FROM notifications
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    /// Notifications addressed to a user plus broadcasts
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageQuery,
    ) -> ApiResult<(Vec<Notification>, i64)> {
        let items = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, title, body, user_id, created_by, created_at
            FROM notifications
            WHERE user_id = $1 OR user_id IS NULL
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 OR user_id IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Device token registered for a user, if any
    pub async fn push_token(&self, user_id: Uuid) -> ApiResult<Option<String>> {
        let token: Option<Option<String>> =
            sqlx::query_scalar("SELECT push_token FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(token.flatten())
    }
}
