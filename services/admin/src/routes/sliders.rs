//! Slider routes

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
    models::{Slider, SliderFields},
    response::Envelope,
    state::AppState,
    validation::validate_required,
};

pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/sliders/add", post(add_slider))
        .route("/sliders/:id", put(update_slider).delete(delete_slider))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/sliders", get(list_sliders))
}

fn validate(fields: &SliderFields) -> ApiResult<()> {
    validate_required("title", &fields.title)?;
    validate_required("image", &fields.image)
}

pub async fn add_slider(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<SliderFields>,
) -> ApiResult<Envelope<Slider>> {
    validate(&payload)?;
    let slider = state.sliders.create(&payload, Some(auth.id)).await?;
    Ok(Envelope::panel("Slider created", slider).with_status(StatusCode::CREATED))
}

pub async fn list_sliders(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Slider>>> {
    let sliders = state.sliders.list().await?;
    Ok(Envelope::panel("Sliders fetched", sliders))
}

pub async fn update_slider(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SliderFields>,
) -> ApiResult<Envelope<Slider>> {
    validate(&payload)?;
    let slider = state
        .sliders
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Slider not found".to_string()))?;
    Ok(Envelope::panel("Slider updated", slider))
}

pub async fn delete_slider(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Value>> {
    if !state.sliders.delete(id).await? {
        return Err(ApiError::NotFound("Slider not found".to_string()));
    }
    Ok(Envelope::panel("Slider deleted", json!({ "id": id })))
}
