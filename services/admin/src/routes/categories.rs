//! Category routes

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
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
    models::{Category, CategoryFields},
    response::{Envelope, PageQuery, Paginated},
    state::AppState,
    validation::{validate_color, validate_required},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/add", post(add_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
}

fn validate(fields: &CategoryFields) -> ApiResult<()> {
    validate_required("name", &fields.name)?;
    validate_color(fields.color.as_deref())
}

pub async fn add_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CategoryFields>,
) -> ApiResult<Envelope<Category>> {
    validate(&payload)?;
    let category = state.categories.create(&payload, Some(auth.id)).await?;
    Ok(Envelope::panel("Category created", category).with_status(StatusCode::CREATED))
}

pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Envelope<Paginated<Category>>> {
    let (items, total) = state.categories.list(&page).await?;
    Ok(Envelope::panel(
        "Categories fetched",
        Paginated::new(items, &page, total),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CategoryFields>,
) -> ApiResult<Envelope<Category>> {
    validate(&payload)?;
    let category = state
        .categories
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(Envelope::panel("Category updated", category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Value>> {
    if state.categories.delete_if_unused(id).await? {
        return Ok(Envelope::panel("Category deleted", json!({ "id": id })));
    }

    if !state.categories.exists(id).await? {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }
    let entries = state.categories.count_entries(id).await?;
    Err(ApiError::Conflict(format!(
        "Category is used by {} transaction(s)",
        entries
    )))
}
