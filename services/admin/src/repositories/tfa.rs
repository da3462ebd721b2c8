//! Two-factor session repository

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{TfaSession, TfaStatus},
};

const SESSION_FIELDS: &str = "id, user_id, code_hash, status, expires_at, validated_at, created_at";

fn session_from_row(row: &PgRow) -> ApiResult<TfaSession> {
    let status: String = row.try_get("status")?;
    let status = TfaStatus::from_code(&status)
        .ok_or_else(|| ApiError::Internal(format!("Unknown session status in store: {}", status)))?;

    Ok(TfaSession {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        code_hash: row.try_get("code_hash")?,
        status,
        expires_at: row.try_get("expires_at")?,
        validated_at: row.try_get("validated_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[derive(Clone)]
pub struct TfaRepository {
    pool: PgPool,
}

impl TfaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> ApiResult<TfaSession> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tfa_sessions (user_id, code_hash, status, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SESSION_FIELDS
        ))
        .bind(user_id)
        .bind(code_hash)
        .bind(TfaStatus::Pending.as_str())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        session_from_row(&row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<TfaSession>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM tfa_sessions WHERE id = $1",
            SESSION_FIELDS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    /// PENDING -> VALIDATED, only while the session is unexpired
    pub async fn mark_validated(&self, id: Uuid) -> ApiResult<Option<TfaSession>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE tfa_sessions
            SET status = $2, validated_at = NOW()
            WHERE id = $1 AND status = $3 AND expires_at > NOW()
            RETURNING {}
            "#,
            SESSION_FIELDS
        ))
        .bind(id)
        .bind(TfaStatus::Validated.as_str())
        .bind(TfaStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }
}
