use std::borrow::Cow;

use axum::response::{IntoResponse, Response};
use axum::Json;
use hyper::StatusCode;
use serde::Serialize;

/// Machine-readable error code carried next to the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApiErrorCode(pub u16);

impl ApiErrorCode {
    pub const ROUTE_NOT_FOUND: Self = Self(404);
}

/// JSON body for requests outside the news routes. `/news` itself never errors.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub status: Cow<'static, str>,
    pub error_code: ApiErrorCode,
    pub error: Cow<'static, str>,
}

impl ApiError {
    fn new(status_code: StatusCode, error_code: ApiErrorCode, error: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status_code,
            status: Cow::Borrowed(status_code.canonical_reason().unwrap_or("unknown")),
            error_code,
            error: error.into(),
        }
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorCode::ROUTE_NOT_FOUND, "route not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}
