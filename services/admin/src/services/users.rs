//! User directory: registration, search, profile and the generic patch

use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::{
    columns::validate_patch,
    error::{ApiError, ApiResult},
    models::{DocumentUpload, NewUser, User, UserDocuments, UserProfile},
    repositories::{LedgerRepository, LevelRepository, UserRepository},
    response::{PageQuery, Paginated},
    services::LifecycleService,
    validation::{validate_email, validate_gender, validate_phone, validate_required},
};

/// Result of a generic patch that passed validation
#[derive(Debug)]
pub enum PatchOutcome {
    /// Empty patch; nothing was written
    NoUpdates,
    Updated(User),
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    levels: LevelRepository,
    ledger: LedgerRepository,
    lifecycle: LifecycleService,
}

impl UserService {
    pub fn new(
        users: UserRepository,
        levels: LevelRepository,
        ledger: LedgerRepository,
        lifecycle: LifecycleService,
    ) -> Self {
        Self {
            users,
            levels,
            ledger,
            lifecycle,
        }
    }

    pub async fn register(&self, new_user: &NewUser) -> ApiResult<User> {
        validate_required("name", &new_user.name)?;
        validate_email(&new_user.email)?;
        validate_phone(new_user.phone.as_deref())?;
        validate_gender(new_user.gender.as_deref())?;

        self.users.create(new_user).await.map_err(|e| match e {
            ApiError::Conflict(_) => ApiError::Conflict("Email is already registered".to_string()),
            other => other,
        })
    }

    pub async fn exists(&self, user_id: Uuid) -> ApiResult<bool> {
        self.users.exists(user_id).await
    }

    pub async fn list(&self, page: &PageQuery) -> ApiResult<Paginated<User>> {
        let (items, total) = self.users.list(page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn search(&self, query: &str, page: &PageQuery) -> ApiResult<Paginated<User>> {
        let (items, total) = self.users.search(query.trim(), page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn profile(&self, user_id: Uuid) -> ApiResult<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let level = match user.level_id {
            Some(level_id) => self.levels.find_by_id(level_id).await?,
            None => None,
        };
        let balances = self.ledger.balances(user_id).await?;

        Ok(UserProfile {
            user,
            level,
            balances,
        })
    }

    /// Generic column patch
    ///
    /// Unknown columns, then type mismatches, then a missing user are
    /// reported in that order; an empty patch never reaches the store.
    pub async fn update_user_columns(
        &self,
        user_id: Uuid,
        updates: &Map<String, Value>,
    ) -> ApiResult<PatchOutcome> {
        if updates.is_empty() {
            return Ok(PatchOutcome::NoUpdates);
        }

        let patch = validate_patch(updates)?;

        self.users
            .apply_patch(user_id, &patch)
            .await?
            .map(PatchOutcome::Updated)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Store a document path, then submit the user for review
    pub async fn add_document(&self, upload: &DocumentUpload) -> ApiResult<UserDocuments> {
        validate_required("doc_type", &upload.doc_type)?;
        validate_required("path", &upload.path)?;

        let documents = self
            .users
            .add_document(upload.user_id, &upload.doc_type, &upload.path)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!("Stored {} document for user {}", upload.doc_type, upload.user_id);

        let change = self.lifecycle.promote_to_pending(upload.user_id).await?;

        Ok(UserDocuments {
            user_id: upload.user_id,
            documents,
            status_changed: change.status_changed,
        })
    }

    pub async fn documents(&self, user_id: Uuid) -> ApiResult<Value> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.documents)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }
}
