//! Verification code routes

use axum::{
    Extension, Router,
    extract::State,
    routing::post,
};

use crate::{
    error::ApiResult,
    extractors::ApiJson,
    middleware::AuthUser,
    models::{SendCodeRequest, TfaIssued, TfaSession, VerifyCodeRequest},
    response::Envelope,
    routes::ensure_self_or_staff,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tfa/send", post(send_code))
        .route("/tfa/verify", post(verify_code))
}

pub async fn send_code(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<SendCodeRequest>,
) -> ApiResult<Envelope<TfaIssued>> {
    ensure_self_or_staff(&auth, payload.user_id)?;
    let issued = state.tfa.send_code(payload.user_id).await?;
    Ok(Envelope::panel("Verification code sent", issued))
}

pub async fn verify_code(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<VerifyCodeRequest>,
) -> ApiResult<Envelope<TfaSession>> {
    let session = state.tfa.verify_code(&auth, &payload).await?;
    Ok(Envelope::panel("Code verified", session))
}
