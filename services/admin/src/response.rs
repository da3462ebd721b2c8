//! Response envelopes and pagination helpers
//!
//! Panel routes answer with `{responseCode, responseMessage, data}`, user
//! profile and document routes with `{statusCode, message, data}`. Both
//! shapes are kept on the wire; each route group picks one.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Envelope shape used by a route group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStyle {
    /// `{responseCode, responseMessage, data}`
    Panel,
    /// `{statusCode, message, data}`
    Detail,
}

impl EnvelopeStyle {
    /// Wrap a payload in this envelope
    pub fn wrap(self, status: StatusCode, message: &str, data: Value) -> Value {
        match self {
            EnvelopeStyle::Panel => json!({
                "responseCode": status.as_u16(),
                "responseMessage": message,
                "data": data,
            }),
            EnvelopeStyle::Detail => json!({
                "statusCode": status.as_u16(),
                "message": message,
                "data": data,
            }),
        }
    }
}

/// Successful response rendered in one of the envelopes
#[derive(Debug)]
pub struct Envelope<T> {
    style: EnvelopeStyle,
    status: StatusCode,
    message: String,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    /// 200 response in the panel envelope
    pub fn panel(message: impl Into<String>, data: T) -> Self {
        Self {
            style: EnvelopeStyle::Panel,
            status: StatusCode::OK,
            message: message.into(),
            data,
        }
    }

    /// 200 response in the detail envelope
    pub fn detail(message: impl Into<String>, data: T) -> Self {
        Self {
            style: EnvelopeStyle::Detail,
            status: StatusCode::OK,
            message: message.into(),
            data,
        }
    }

    /// Override the HTTP status (e.g. 201 for creations)
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response payload: {}", e);
                let body = self.style.wrap(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Value::Null,
                );
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let body = self.style.wrap(self.status, &self.message, data);
        (self.status, Json(body)).into_response()
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for paged listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) as i64 * self.limit() as i64
    }
}

/// A page of results plus the totals needed to render pagination
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, query: &PageQuery, total: i64) -> Self {
        let limit = query.limit();
        Self {
            items,
            page: query.page(),
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }
}

/// `ceil(total / limit)`
pub fn total_pages(total: i64, limit: u32) -> i64 {
    if total <= 0 {
        return 0;
    }
    let limit = limit.max(1) as i64;
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }

    #[test]
    fn test_page_query_defaults_and_clamps() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
        assert_eq!(query.offset(), 0);

        let query = PageQuery::new(0, 1000);
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 100);

        let query = PageQuery::new(3, 25);
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn test_envelope_shapes() {
        let panel = EnvelopeStyle::Panel.wrap(StatusCode::OK, "ok", json!([1]));
        assert_eq!(panel["responseCode"], 200);
        assert_eq!(panel["responseMessage"], "ok");
        assert_eq!(panel["data"], json!([1]));

        let detail = EnvelopeStyle::Detail.wrap(StatusCode::NOT_FOUND, "User not found", Value::Null);
        assert_eq!(detail["statusCode"], 404);
        assert_eq!(detail["message"], "User not found");
        assert!(detail.get("responseCode").is_none());
    }
}
