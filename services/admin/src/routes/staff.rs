//! Role and staff member routes

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath},
    models::{NewRole, NewStaff, Role, Staff, UpdateRole, UpdateStaff},
    response::Envelope,
    state::AppState,
    validation::{validate_acl, validate_email, validate_password, validate_required},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/staff/roles", get(list_roles).post(create_role))
        .route(
            "/staff/roles/:id",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/staff/members", get(list_staff).post(create_staff))
        .route(
            "/staff/members/:id",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
}

fn role_not_found() -> ApiError {
    ApiError::NotFound("Role not found".to_string())
}

fn staff_not_found() -> ApiError {
    ApiError::NotFound("Staff member not found".to_string())
}

pub async fn create_role(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewRole>,
) -> ApiResult<Envelope<Role>> {
    validate_required("name", &payload.name)?;
    validate_acl(&payload.acl)?;
    let role = state.roles.create(&payload).await?;
    Ok(Envelope::panel("Role created", role).with_status(StatusCode::CREATED))
}

pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Role>>> {
    let roles = state.roles.list().await?;
    Ok(Envelope::panel("Roles fetched", roles))
}

pub async fn get_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Role>> {
    let role = state.roles.find_by_id(id).await?.ok_or_else(role_not_found)?;
    Ok(Envelope::panel("Role fetched", role))
}

pub async fn update_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateRole>,
) -> ApiResult<Envelope<Role>> {
    if let Some(name) = &payload.name {
        validate_required("name", name)?;
    }
    if let Some(acl) = &payload.acl {
        validate_acl(acl)?;
    }
    let role = state
        .roles
        .update(id, &payload)
        .await?
        .ok_or_else(role_not_found)?;
    Ok(Envelope::panel("Role updated", role))
}

pub async fn delete_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Value>> {
    if state.roles.delete_if_unused(id).await? {
        return Ok(Envelope::panel("Role deleted", json!({ "id": id })));
    }

    if state.roles.find_by_id(id).await?.is_none() {
        return Err(role_not_found());
    }
    let members = state.roles.count_staff(id).await?;
    Err(ApiError::Conflict(format!(
        "Role is assigned to {} staff member(s)",
        members
    )))
}

pub async fn create_staff(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewStaff>,
) -> ApiResult<Envelope<Staff>> {
    validate_required("name", &payload.name)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    if state.roles.find_by_id(payload.role_id).await?.is_none() {
        return Err(role_not_found());
    }

    let staff = state.staff.create(&payload).await?;
    Ok(Envelope::panel("Staff member created", staff).with_status(StatusCode::CREATED))
}

pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Staff>>> {
    let staff = state.staff.list().await?;
    Ok(Envelope::panel("Staff fetched", staff))
}

pub async fn get_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Staff>> {
    let staff = state
        .staff
        .find_by_id(id)
        .await?
        .ok_or_else(staff_not_found)?;
    Ok(Envelope::panel("Staff member fetched", staff))
}

pub async fn update_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStaff>,
) -> ApiResult<Envelope<Staff>> {
    if let Some(name) = &payload.name {
        validate_required("name", name)?;
    }
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }
    if let Some(role_id) = payload.role_id {
        if state.roles.find_by_id(role_id).await?.is_none() {
            return Err(role_not_found());
        }
    }

    let staff = state
        .staff
        .update(id, &payload)
        .await?
        .ok_or_else(staff_not_found)?;
    Ok(Envelope::panel("Staff member updated", staff))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Envelope<Value>> {
    if !state.staff.delete(id).await? {
        return Err(staff_not_found());
    }
    Ok(Envelope::panel("Staff member deleted", json!({ "id": id })))
}
