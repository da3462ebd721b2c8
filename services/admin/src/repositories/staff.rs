//! Role and staff repositories

use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    hashing::hash_secret,
    models::{NewRole, NewStaff, Role, Staff, StaffStatus, UpdateRole, UpdateStaff},
};

const ROLE_FIELDS: &str = "id, name, acl, created_at, updated_at";
const STAFF_FIELDS: &str = "id, name, email, password_hash, status, role_id, created_at, updated_at";

fn staff_from_row(row: &PgRow) -> ApiResult<Staff> {
    let status: String = row.try_get("status")?;
    let status = StaffStatus::from_code(&status)
        .ok_or_else(|| ApiError::Internal(format!("Unknown staff status in store: {}", status)))?;

    Ok(Staff {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        status,
        role_id: row.try_get("role_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Role repository
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, role: &NewRole) -> ApiResult<Role> {
        info!("Creating role: {}", role.name);

        let role = sqlx::query_as::<_, Role>(&format!(
            "INSERT INTO roles (name, acl) VALUES ($1, $2) RETURNING {}",
            ROLE_FIELDS
        ))
        .bind(&role.name)
        .bind(Json(&role.acl))
        .fetch_one(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn list(&self) -> ApiResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles ORDER BY name ASC",
            ROLE_FIELDS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE id = $1",
            ROLE_FIELDS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn update(&self, id: Uuid, update: &UpdateRole) -> ApiResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                acl = COALESCE($3, acl),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ROLE_FIELDS
        ))
        .bind(id)
        .bind(&update.name)
        .bind(update.acl.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn count_staff(&self, id: Uuid) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staff WHERE role_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a role only while no staff member holds it
    pub async fn delete_if_unused(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM staff WHERE role_id = $1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Staff repository
#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, staff: &NewStaff) -> ApiResult<Staff> {
        info!("Creating staff member: {}", staff.email);

        let password_hash = hash_secret(&staff.password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO staff (name, email, password_hash, status, role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            STAFF_FIELDS
        ))
        .bind(&staff.name)
        .bind(&staff.email)
        .bind(&password_hash)
        .bind(StaffStatus::Active.as_str())
        .bind(staff.role_id)
        .fetch_one(&self.pool)
        .await?;

        staff_from_row(&row)
    }

    pub async fn list(&self) -> ApiResult<Vec<Staff>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM staff ORDER BY created_at DESC",
            STAFF_FIELDS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(staff_from_row).collect()
    }

    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Staff>> {
        let row = sqlx::query(&format!("SELECT {} FROM staff WHERE id = $1", STAFF_FIELDS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(staff_from_row).transpose()
    }

    pub async fn update(&self, id: Uuid, update: &UpdateStaff) -> ApiResult<Option<Staff>> {
        let password_hash = update
            .password
            .as_deref()
            .map(hash_secret)
            .transpose()?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE staff
            SET name = COALESCE($2, name),
                status = COALESCE($3, status),
                role_id = COALESCE($4, role_id),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            STAFF_FIELDS
        ))
        .bind(id)
        .bind(&update.name)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.role_id)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(staff_from_row).transpose()
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
