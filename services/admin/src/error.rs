//! Error types for the admin service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::{columns::ColumnMismatch, response::EnvelopeStyle};

/// Custom error type for the admin service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Operation blocked by existing associations or state
    #[error("{0}")]
    Conflict(String),

    /// Level reference does not exist
    #[error("Invalid level")]
    InvalidLevel,

    /// Generic patch named columns that are unknown or read-only
    #[error("Invalid columns: {}", .0.join(", "))]
    InvalidColumns(Vec<String>),

    /// Generic patch values of the wrong kind
    #[error("Type mismatch in {} column(s)", .0.len())]
    TypeMismatch(Vec<ColumnMismatch>),

    /// Missing, invalid, expired or revoked token
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed
    #[error("Forbidden")]
    Forbidden,

    /// Rate limit exceeded
    #[error("Too many attempts, try again later")]
    TooManyRequests,

    /// Store failure or unexpected error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidLevel
            | ApiError::InvalidColumns(_)
            | ApiError::TypeMismatch(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn data(&self) -> Value {
        match self {
            ApiError::InvalidColumns(columns) => json!({ "invalidColumns": columns }),
            ApiError::TypeMismatch(mismatches) => json!({ "typeMismatches": mismatches }),
            _ => Value::Null,
        }
    }

    /// Render this error in the given envelope
    pub fn into_styled_response(self, style: EnvelopeStyle) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("Request rejected: {}", self);
        }

        let body = style.wrap(status, &self.to_string(), self.data());
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict(format!(
                    "Duplicate value violates {}",
                    db_err.constraint().unwrap_or("a unique constraint")
                )),
                Some("23503") => ApiError::Conflict(format!(
                    "Record is still referenced ({})",
                    db_err.constraint().unwrap_or("foreign key")
                )),
                _ => ApiError::Internal(err.to_string()),
            },
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<common::error::DatabaseError> for ApiError {
    fn from(err: common::error::DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_styled_response(EnvelopeStyle::Panel)
    }
}

/// An error rendered in the `{statusCode, message, data}` envelope
#[derive(Debug)]
pub struct DetailError(pub ApiError);

impl From<ApiError> for DetailError {
    fn from(err: ApiError) -> Self {
        DetailError(err)
    }
}

impl From<sqlx::Error> for DetailError {
    fn from(err: sqlx::Error) -> Self {
        DetailError(err.into())
    }
}

impl IntoResponse for DetailError {
    fn into_response(self) -> Response {
        self.0.into_styled_response(EnvelopeStyle::Detail)
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("name is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidLevel.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound("User not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("Level has users".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_columns_data_lists_every_column() {
        let err = ApiError::InvalidColumns(vec!["foo".into(), "bar".into()]);
        assert_eq!(err.to_string(), "Invalid columns: foo, bar");
        assert_eq!(err.data(), json!({ "invalidColumns": ["foo", "bar"] }));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_internal_message_keeps_driver_text() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        match err {
            ApiError::Internal(msg) => assert!(msg.contains("timed out")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
