//! Request extractors that reject inside the response envelopes
//!
//! axum's own `Json`, `Path` and `Query` answer malformed input with a
//! plain-text body. These wrappers turn the rejection into an
//! [`ApiError`] (Panel envelope) or a [`DetailError`] (Detail envelope).

use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::error::{ApiError, DetailError};

/// JSON body, rejected in the Panel envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters, rejected in the Panel envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string, rejected in the Panel envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// JSON body, rejected in the Detail envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(DetailError))]
pub struct DetailJson<T>(pub T);

/// Path parameters, rejected in the Detail envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(DetailError))]
pub struct DetailPath<T>(pub T);

/// Client mistakes become validation errors; anything axum reports as a
/// server fault stays internal
fn rejection_error(status: StatusCode, text: String) -> ApiError {
    if status.is_server_error() {
        ApiError::Internal(text)
    } else {
        ApiError::Validation(text)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        rejection_error(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        rejection_error(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        rejection_error(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for DetailError {
    fn from(rejection: JsonRejection) -> Self {
        DetailError(rejection.into())
    }
}

impl From<PathRejection> for DetailError {
    fn from(rejection: PathRejection) -> Self {
        DetailError(rejection.into())
    }
}
