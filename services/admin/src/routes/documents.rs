//! Document upload routes

use axum::{
    Extension, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    error::DetailError,
    extractors::{DetailJson, DetailPath},
    middleware::AuthUser,
    models::{DocumentUpload, UserDocuments},
    response::Envelope,
    routes::ensure_self_or_staff,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/documents", post(upload_document))
}

pub fn staff_routes() -> Router<AppState> {
    Router::new().route("/documents/:user_id", get(get_documents))
}

pub async fn upload_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    DetailJson(payload): DetailJson<DocumentUpload>,
) -> Result<Envelope<UserDocuments>, DetailError> {
    ensure_self_or_staff(&auth, payload.user_id)?;
    let documents = state.users.add_document(&payload).await?;
    Ok(Envelope::detail("Document uploaded", documents).with_status(StatusCode::CREATED))
}

pub async fn get_documents(
    State(state): State<AppState>,
    DetailPath(user_id): DetailPath<Uuid>,
) -> Result<Envelope<UserDocuments>, DetailError> {
    let documents = state.users.documents(user_id).await?;
    Ok(Envelope::detail(
        "Documents fetched",
        UserDocuments {
            user_id,
            documents,
            status_changed: false,
        },
    ))
}
