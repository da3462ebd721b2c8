//! User repository for database operations

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::{
    columns::ValidatedPatch,
    error::{ApiError, ApiResult},
    models::{NewUser, User, UserStatus},
    response::PageQuery,
};

/// Selected user columns; every query aliases `users` as `u`
const USER_FIELDS: &str = "u.id, u.name, u.email, u.phone, u.dob, u.gender, u.address, \
     u.documents, u.level_id, u.status, u.push_token, u.approved_by, u.created_at";

fn user_from_row(row: &PgRow) -> ApiResult<User> {
    let status: String = row.try_get("status")?;
    let status = UserStatus::from_code(&status)
        .ok_or_else(|| ApiError::Internal(format!("Unknown user status in store: {}", status)))?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        dob: row.try_get("dob")?,
        gender: row.try_get("gender")?,
        address: row.try_get("address")?,
        documents: row.try_get("documents")?,
        level_id: row.try_get("level_id")?,
        status,
        push_token: row.try_get("push_token")?,
        approved_by: row.try_get("approved_by")?,
        created_at: row.try_get("created_at")?,
    })
}

fn users_from_rows(rows: Vec<PgRow>) -> ApiResult<Vec<User>> {
    rows.iter().map(user_from_row).collect()
}

/// Escape LIKE metacharacters and wrap for a substring match
pub fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a user; new users always start INITIATED
    pub async fn create(&self, new_user: &NewUser) -> ApiResult<User> {
        info!("Registering user: {}", new_user.email);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users AS u (name, email, phone, dob, gender, address, push_token, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_FIELDS
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(new_user.dob)
        .bind(&new_user.gender)
        .bind(&new_user.address)
        .bind(&new_user.push_token)
        .bind(UserStatus::Initiated.as_str())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users u WHERE u.id = $1", USER_FIELDS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Whether a user row exists
    pub async fn exists(&self, id: Uuid) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Page through users, newest first
    pub async fn list(&self, page: &PageQuery) -> ApiResult<(Vec<User>, i64)> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM users u
            ORDER BY u.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            USER_FIELDS
        ))
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((users_from_rows(rows)?, total))
    }

    /// Case-insensitive substring search over name, email, address, level name and status
    pub async fn search(&self, query: &str, page: &PageQuery) -> ApiResult<(Vec<User>, i64)> {
        let pattern = like_pattern(query);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM users u
            LEFT JOIN levels l ON l.id = u.level_id
            WHERE u.name ILIKE $1
               OR u.email ILIKE $1
               OR u.address ILIKE $1
               OR l.name ILIKE $1
               OR u.status ILIKE $1
            ORDER BY u.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_FIELDS
        ))
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users u
            LEFT JOIN levels l ON l.id = u.level_id
            WHERE u.name ILIKE $1
               OR u.email ILIKE $1
               OR u.address ILIKE $1
               OR l.name ILIKE $1
               OR u.status ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((users_from_rows(rows)?, total))
    }

    /// Every user referencing a level
    pub async fn find_by_level(&self, level_id: Uuid) -> ApiResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users u WHERE u.level_id = $1 ORDER BY u.created_at DESC",
            USER_FIELDS
        ))
        .bind(level_id)
        .fetch_all(&self.pool)
        .await?;

        users_from_rows(rows)
    }

    /// INITIATED -> PENDING in one conditional statement
    ///
    /// Returns `None` when the user is absent or not INITIATED.
    pub async fn promote_to_pending(&self, id: Uuid) -> ApiResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users AS u
            SET status = $2
            WHERE u.id = $1 AND u.status = $3
            RETURNING {}
            "#,
            USER_FIELDS
        ))
        .bind(id)
        .bind(UserStatus::Pending.as_str())
        .bind(UserStatus::Initiated.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Set a status unconditionally; returns whether a row was affected
    pub async fn set_status(
        &self,
        id: Uuid,
        status: UserStatus,
        approved_by: Option<Uuid>,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = $2,
                approved_by = COALESCE($3, approved_by)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(approved_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set a status only when the current one is among `sources`
    pub async fn set_status_from(
        &self,
        id: Uuid,
        target: UserStatus,
        sources: &[UserStatus],
        approved_by: Option<Uuid>,
    ) -> ApiResult<Option<User>> {
        let sources: Vec<&str> = sources.iter().map(|s| s.as_str()).collect();

        let row = sqlx::query(&format!(
            r#"
            UPDATE users AS u
            SET status = $2,
                approved_by = COALESCE($4, u.approved_by)
            WHERE u.id = $1 AND u.status = ANY($3)
            RETURNING {}
            "#,
            USER_FIELDS
        ))
        .bind(id)
        .bind(target.as_str())
        .bind(&sources)
        .bind(approved_by)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Point a user at a level, but only if that level exists
    ///
    /// Returns the number of rows changed (0 or 1).
    pub async fn set_level_if_exists(&self, user_id: Uuid, level_id: Uuid) -> ApiResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET level_id = $2
            WHERE id = $1
              AND EXISTS (SELECT 1 FROM levels WHERE id = $2)
            "#,
        )
        .bind(user_id)
        .bind(level_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Move every user of one level to another (or to no level)
    pub async fn reassign_level(&self, from: Uuid, to: Option<Uuid>) -> ApiResult<u64> {
        info!("Reassigning users from level {} to {:?}", from, to);

        let result = sqlx::query("UPDATE users SET level_id = $2 WHERE level_id = $1")
            .bind(from)
            .bind(to)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Apply a validated generic patch and return the full row
    pub async fn apply_patch(&self, id: Uuid, patch: &ValidatedPatch) -> ApiResult<Option<User>> {
        info!("Patching user {} columns {:?}", id, patch.columns());

        let sql = format!(
            "UPDATE users AS u SET {} WHERE u.id = $1 RETURNING {}",
            patch.set_clause(),
            USER_FIELDS
        );

        let mut query = sqlx::query(&sql).bind(id);
        for value in patch.values() {
            query = query.bind(value.clone());
        }

        let row = query.fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Merge one `doc_type -> path` pair into the document map
    pub async fn add_document(
        &self,
        id: Uuid,
        doc_type: &str,
        path: &str,
    ) -> ApiResult<Option<serde_json::Value>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET documents = documents || jsonb_build_object($2::TEXT, $3::TEXT)
            WHERE id = $1
            RETURNING documents
            "#,
        )
        .bind(id)
        .bind(doc_type)
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("documents")?)),
            None => Ok(None),
        }
    }
}
