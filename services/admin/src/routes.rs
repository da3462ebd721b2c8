//! Admin service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, require_user, staff_only},
    models::Permission,
    state::AppState,
};

pub mod categories;
pub mod documents;
pub mod ledger;
pub mod levels;
pub mod notifications;
pub mod sliders;
pub mod staff;
pub mod templates;
pub mod tfa;
pub mod users;

/// Create the router for the admin service
pub fn create_router(state: AppState) -> Router {
    let staff_routes = Router::new()
        .merge(staff_only(users::staff_routes(), &state, Permission::Users))
        .merge(staff_only(levels::routes(), &state, Permission::Levels))
        .merge(staff_only(ledger::routes(), &state, Permission::Coins))
        .merge(staff_only(categories::routes(), &state, Permission::Categories))
        .merge(staff_only(staff::routes(), &state, Permission::Staff))
        .merge(staff_only(
            notifications::staff_routes(),
            &state,
            Permission::Notifications,
        ))
        .merge(staff_only(sliders::staff_routes(), &state, Permission::Sliders))
        .merge(staff_only(templates::routes(), &state, Permission::Templates))
        .merge(staff_only(
            documents::staff_routes(),
            &state,
            Permission::Documents,
        ));

    let user_routes = Router::new()
        .merge(notifications::user_routes())
        .merge(sliders::user_routes())
        .merge(tfa::routes())
        .merge(documents::user_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/health", get(health_check))
        .merge(users::public_routes())
        .merge(staff_routes)
        .merge(user_routes)
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let redis = state.redis.health_check().await.unwrap_or(false);

    let status = if database && redis {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "service": "admin-service",
            "database": database,
            "redis": redis,
        })),
    )
}

/// End users may only act on themselves; active staff on anyone
pub(crate) fn ensure_self_or_staff(auth: &AuthUser, user_id: Uuid) -> ApiResult<()> {
    if auth.can_act_for(user_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
