//! User directory and lifecycle routes

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post, put},
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, DetailError},
    extractors::{ApiJson, ApiPath, ApiQuery, DetailPath},
    middleware::AuthUser,
    models::{
        ChangeStatusRequest, EditLevelRequest, NewUser, SearchQuery, StatusChange, User,
        UserProfile,
    },
    response::{Envelope, PageQuery, Paginated},
    services::PatchOutcome,
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/users/register", post(register))
}

pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/search", get(search_users))
        .route("/users/profile/:user_id", get(get_profile))
        .route("/users/by-level/:level_id", get(users_by_level))
        .route("/users/:user_id", patch(update_user_columns))
        .route("/users/changestatus/:user_id", post(change_status))
        .route("/users/transition/:user_id", post(transition_status))
        .route("/users/submit/:user_id", post(submit_for_review))
        .route("/users/editlevel/:user_id", put(edit_level))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewUser>,
) -> ApiResult<Envelope<User>> {
    let user = state.users.register(&payload).await?;
    Ok(Envelope::panel("User registered", user).with_status(StatusCode::CREATED))
}

pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Envelope<Paginated<User>>> {
    let users = state.users.list(&page).await?;
    Ok(Envelope::panel("Users fetched", users))
}

pub async fn search_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Envelope<Paginated<User>>> {
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let users = state.users.search(&query.query, &page).await?;
    Ok(Envelope::panel("Users fetched", users))
}

pub async fn get_profile(
    State(state): State<AppState>,
    DetailPath(user_id): DetailPath<Uuid>,
) -> Result<Envelope<UserProfile>, DetailError> {
    let profile = state.users.profile(user_id).await?;
    Ok(Envelope::detail("User profile fetched", profile))
}

pub async fn users_by_level(
    State(state): State<AppState>,
    ApiPath(level_id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Vec<User>>> {
    let users = state.levels.users_by_level(level_id).await?;
    Ok(Envelope::panel("Users fetched", users))
}

pub async fn update_user_columns(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(updates): ApiJson<Map<String, Value>>,
) -> ApiResult<Envelope<Option<User>>> {
    match state.users.update_user_columns(user_id, &updates).await? {
        PatchOutcome::NoUpdates => Ok(Envelope::panel("No updates provided", None)),
        PatchOutcome::Updated(user) => Ok(Envelope::panel("User updated", Some(user))),
    }
}

pub async fn change_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ChangeStatusRequest>,
) -> ApiResult<Envelope<Value>> {
    let changed = state
        .lifecycle
        .set_status(user_id, &payload.status, Some(auth.id))
        .await?;

    if !changed {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    Ok(Envelope::panel(
        "User status updated",
        serde_json::json!({ "userId": user_id, "status": payload.status }),
    ))
}

pub async fn transition_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ChangeStatusRequest>,
) -> ApiResult<Envelope<User>> {
    let user = state
        .lifecycle
        .transition(user_id, &payload.status, Some(auth.id))
        .await?;
    Ok(Envelope::panel("User status updated", user))
}

pub async fn submit_for_review(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Envelope<StatusChange>> {
    let change = state.lifecycle.promote_to_pending(user_id).await?;
    let message = if change.status_changed {
        "User submitted for review"
    } else {
        "User status unchanged"
    };
    Ok(Envelope::panel(message, change))
}

pub async fn edit_level(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<EditLevelRequest>,
) -> ApiResult<Envelope<Value>> {
    state.levels.update_user_level(user_id, payload.level).await?;
    Ok(Envelope::panel(
        "User level updated",
        serde_json::json!({ "userId": user_id, "level": payload.level }),
    ))
}
