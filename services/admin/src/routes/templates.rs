//! Message template routes

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
    models::{Template, TemplateFields},
    response::Envelope,
    state::AppState,
    validation::validate_required,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route(
            "/templates/:id",
            get(get_template).put(update_template).delete(delete_template),
        )
}

fn validate(fields: &TemplateFields) -> ApiResult<()> {
    validate_required("name", &fields.name)?;
    validate_required("subject", &fields.subject)?;
    if fields.body.trim().is_empty() {
        return Err(ApiError::Validation("body is required".to_string()));
    }
    Ok(())
}

fn not_found() -> ApiError {
    ApiError::NotFound("Template not found".to_string())
}

pub async fn create_template(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<TemplateFields>,
) -> ApiResult<Envelope<Template>> {
    validate(&payload)?;
    let template = state.templates.create(&payload, Some(auth.id)).await?;
    Ok(Envelope::panel("Template created", template).with_status(StatusCode::CREATED))
}

pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Template>>> {
    let templates = state.templates.list().await?;
    Ok(Envelope::panel("Templates fetched", templates))
}

pub async fn get_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Template>> {
    let template = state.templates.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Envelope::panel("Template fetched", template))
}

pub async fn update_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<TemplateFields>,
) -> ApiResult<Envelope<Template>> {
    validate(&payload)?;
    let template = state
        .templates
        .update(id, &payload)
        .await?
        .ok_or_else(not_found)?;
    Ok(Envelope::panel("Template updated", template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Value>> {
    if !state.templates.delete(id).await? {
        return Err(not_found());
    }
    Ok(Envelope::panel("Template deleted", json!({ "id": id })))
}
