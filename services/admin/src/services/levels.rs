//! Level registry and cascade reassignment

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Level, LevelFields, User},
    repositories::{LevelRepository, UserRepository},
};

#[derive(Clone)]
pub struct LevelService {
    levels: LevelRepository,
    users: UserRepository,
}

impl LevelService {
    pub fn new(levels: LevelRepository, users: UserRepository) -> Self {
        Self { levels, users }
    }

    pub async fn create_level(
        &self,
        fields: &LevelFields,
        created_by: Option<Uuid>,
    ) -> ApiResult<Level> {
        fields.validate().map_err(ApiError::Validation)?;
        self.levels.create(fields, created_by).await
    }

    pub async fn update_level(&self, id: Uuid, fields: &LevelFields) -> ApiResult<Level> {
        fields.validate().map_err(ApiError::Validation)?;
        self.levels
            .update(id, fields)
            .await?
            .ok_or_else(|| ApiError::NotFound("Level not found".to_string()))
    }

    pub async fn get_level(&self, id: Uuid) -> ApiResult<Level> {
        self.levels
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Level not found".to_string()))
    }

    pub async fn list_levels(&self) -> ApiResult<Vec<Level>> {
        self.levels.list().await
    }

    /// Delete a level that no user references
    pub async fn delete_level(&self, id: Uuid) -> ApiResult<()> {
        if self.levels.delete_if_unused(id).await? {
            info!("Deleted level {}", id);
            return Ok(());
        }

        if !self.levels.exists(id).await? {
            return Err(ApiError::NotFound("Level not found".to_string()));
        }

        let users = self.levels.count_users(id).await?;
        Err(ApiError::Conflict(format!(
            "Level is still assigned to {} user(s); reassign them first",
            users
        )))
    }

    /// Point one user at an existing level
    pub async fn update_user_level(&self, user_id: Uuid, level_id: Uuid) -> ApiResult<()> {
        if self.users.set_level_if_exists(user_id, level_id).await? > 0 {
            info!("User {} moved to level {}", user_id, level_id);
            return Ok(());
        }

        if !self.levels.exists(level_id).await? {
            return Err(ApiError::InvalidLevel);
        }
        Err(ApiError::NotFound("User not found".to_string()))
    }

    /// Move every user of `from` to `to` (or to no level); returns the count moved
    pub async fn bulk_reassign(&self, from: Uuid, to: Option<Uuid>) -> ApiResult<u64> {
        if let Some(to) = to {
            if !self.levels.exists(to).await? {
                return Err(ApiError::InvalidLevel);
            }
        }

        // A target deleted after the check above trips the foreign key
        match self.users.reassign_level(from, to).await {
            Err(ApiError::Conflict(_)) => Err(ApiError::InvalidLevel),
            other => other,
        }
    }

    pub async fn users_by_level(&self, level_id: Uuid) -> ApiResult<Vec<User>> {
        self.users.find_by_level(level_id).await
    }
}
