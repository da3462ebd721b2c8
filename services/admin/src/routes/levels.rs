//! Level registry routes

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
    models::{Level, LevelFields, ReassignRequest},
    response::Envelope,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/levels", get(list_levels))
        .route("/levels/addlevel", post(add_level))
        .route("/levels/reassign", post(reassign_users))
        .route(
            "/levels/:id",
            get(get_level).put(update_level).delete(delete_level),
        )
}

pub async fn add_level(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<LevelFields>,
) -> ApiResult<Envelope<Level>> {
    let level = state.levels.create_level(&payload, Some(auth.id)).await?;
    Ok(Envelope::panel("Level created", level).with_status(StatusCode::CREATED))
}

pub async fn list_levels(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Level>>> {
    let levels = state.levels.list_levels().await?;
    Ok(Envelope::panel("Levels fetched", levels))
}

pub async fn get_level(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Level>> {
    let level = state.levels.get_level(id).await?;
    Ok(Envelope::panel("Level fetched", level))
}

pub async fn update_level(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<LevelFields>,
) -> ApiResult<Envelope<Level>> {
    let level = state.levels.update_level(id, &payload).await?;
    Ok(Envelope::panel("Level updated", level))
}

pub async fn delete_level(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Value>> {
    state.levels.delete_level(id).await?;
    Ok(Envelope::panel("Level deleted", json!({ "id": id })))
}

pub async fn reassign_users(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReassignRequest>,
) -> ApiResult<Envelope<Value>> {
    let moved = state
        .levels
        .bulk_reassign(payload.from_level, payload.to_level)
        .await?;
    Ok(Envelope::panel(
        "Users reassigned",
        json!({ "fromLevel": payload.from_level, "toLevel": payload.to_level, "count": moved }),
    ))
}
