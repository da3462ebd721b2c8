//! User lifecycle controller
//!
//! Two ways to change a status coexist: [`LifecycleService::set_status`]
//! accepts any administrator-settable target regardless of the current
//! state, while [`LifecycleService::transition`] only follows the edges of
//! [`UserStatus::can_transition_to`]. Both are single conditional statements.

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{StatusChange, User, UserStatus},
    repositories::UserRepository,
};

#[derive(Clone)]
pub struct LifecycleService {
    users: UserRepository,
}

/// Only a verification records who approved it
fn approver_for(target: UserStatus, actor: Option<Uuid>) -> Option<Uuid> {
    if target == UserStatus::Verified {
        actor
    } else {
        None
    }
}

fn parse_admin_target(code: &str) -> ApiResult<UserStatus> {
    UserStatus::admin_target(code).ok_or_else(|| {
        ApiError::Validation(format!(
            "Invalid status '{}', expected one of {}",
            code,
            UserStatus::ADMIN_SETTABLE
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

impl LifecycleService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// INITIATED -> PENDING; any other state is returned unchanged
    pub async fn promote_to_pending(&self, user_id: Uuid) -> ApiResult<StatusChange> {
        if let Some(user) = self.users.promote_to_pending(user_id).await? {
            info!("User {} submitted for review", user_id);
            return Ok(StatusChange {
                user,
                status_changed: true,
            });
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(StatusChange {
            user,
            status_changed: false,
        })
    }

    /// Permissive status change
    ///
    /// Returns whether a row was affected; `false` means the user does not exist.
    pub async fn set_status(
        &self,
        user_id: Uuid,
        status: &str,
        actor: Option<Uuid>,
    ) -> ApiResult<bool> {
        let target = parse_admin_target(status)?;
        let changed = self
            .users
            .set_status(user_id, target, approver_for(target, actor))
            .await?;

        if changed {
            info!("User {} status set to {}", user_id, target);
        }
        Ok(changed)
    }

    /// Strict status change along the lifecycle graph
    pub async fn transition(
        &self,
        user_id: Uuid,
        status: &str,
        actor: Option<Uuid>,
    ) -> ApiResult<User> {
        let target = parse_admin_target(status)?;
        let sources = UserStatus::sources_of(target);

        if let Some(user) = self
            .users
            .set_status_from(user_id, target, &sources, approver_for(target, actor))
            .await?
        {
            info!("User {} moved to {}", user_id, target);
            return Ok(user);
        }

        match self.users.find_by_id(user_id).await? {
            None => Err(ApiError::NotFound("User not found".to_string())),
            Some(user) => Err(ApiError::Conflict(format!(
                "Illegal transition from {} to {}",
                user.status, target
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_verification_records_approver() {
        let actor = Some(Uuid::new_v4());
        assert_eq!(approver_for(UserStatus::Verified, actor), actor);
        assert_eq!(approver_for(UserStatus::Blocked, actor), None);
        assert_eq!(approver_for(UserStatus::Rejected, actor), None);
    }

    #[test]
    fn test_parse_admin_target_rejects_unknown_values() {
        assert_eq!(parse_admin_target("REJECTED").unwrap(), UserStatus::Rejected);
        assert!(matches!(
            parse_admin_target("INITIATED"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            parse_admin_target("verified"),
            Err(ApiError::Validation(_))
        ));
    }
}
