//! Notification and push routes

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
    models::{DevicePushRequest, NewNotification, Notification, PushOutcome, TopicPushRequest},
    notify::PushTarget,
    response::{Envelope, PageQuery, Paginated},
    routes::ensure_self_or_staff,
    state::AppState,
    validation::validate_required,
};

/// Topic every device subscribes to
pub const BROADCAST_TOPIC: &str = "all";

#[derive(Debug, Serialize)]
pub struct CreatedNotification {
    pub notification: Notification,
    pub delivered: bool,
}

pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications).post(create_notification))
        .route("/notifications/:id", delete(delete_notification))
        .route("/notifications/push/topic", post(push_to_topic))
        .route("/notifications/push/device", post(push_to_device))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/notifications/user/:user_id", get(user_notifications))
}

async fn device_target(state: &AppState, user_id: Uuid) -> ApiResult<PushTarget> {
    state
        .notifications
        .push_token(user_id)
        .await?
        .map(PushTarget::Device)
        .ok_or_else(|| ApiError::Validation("User has no registered device".to_string()))
}

pub async fn create_notification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<NewNotification>,
) -> ApiResult<Envelope<CreatedNotification>> {
    validate_required("title", &payload.title)?;
    validate_required("body", &payload.body)?;

    let notification = state.notifications.create(&payload, Some(auth.id)).await?;

    let delivered = if payload.push {
        let target = match payload.user_id {
            Some(user_id) => device_target(&state, user_id).await.ok(),
            None => Some(PushTarget::Topic(BROADCAST_TOPIC.to_string())),
        };
        match target {
            Some(target) => {
                state
                    .push
                    .deliver(&target, &notification.title, &notification.body)
                    .await
            }
            None => false,
        }
    } else {
        false
    };

    Ok(Envelope::panel(
        "Notification created",
        CreatedNotification {
            notification,
            delivered,
        },
    )
    .with_status(StatusCode::CREATED))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Envelope<Paginated<Notification>>> {
    let (items, total) = state.notifications.list_all(&page).await?;
    Ok(Envelope::panel(
        "Notifications fetched",
        Paginated::new(items, &page, total),
    ))
}

pub async fn user_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Envelope<Paginated<Notification>>> {
    ensure_self_or_staff(&auth, user_id)?;
    let (items, total) = state.notifications.list_for_user(user_id, &page).await?;
    Ok(Envelope::panel(
        "Notifications fetched",
        Paginated::new(items, &page, total),
    ))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Value>> {
    if !state.notifications.delete(id).await? {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }
    Ok(Envelope::panel("Notification deleted", json!({ "id": id })))
}

pub async fn push_to_topic(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TopicPushRequest>,
) -> ApiResult<Envelope<PushOutcome>> {
    validate_required("topic", &payload.topic)?;
    let target = PushTarget::Topic(payload.topic.clone());
    let delivered = state
        .push
        .deliver(&target, &payload.title, &payload.body)
        .await;
    Ok(Envelope::panel("Push dispatched", PushOutcome { delivered }))
}

pub async fn push_to_device(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DevicePushRequest>,
) -> ApiResult<Envelope<PushOutcome>> {
    if !state.users.exists(payload.user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    let target = device_target(&state, payload.user_id).await?;
    let delivered = state
        .push
        .deliver(&target, &payload.title, &payload.body)
        .await;
    Ok(Envelope::panel("Push dispatched", PushOutcome { delivered }))
}
