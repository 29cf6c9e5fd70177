//! Success envelope: `{success, data, message?, pagination?}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tally_shared::types::{PageMeta, PageResponse};

/// Success response wrapper used by every handler.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`; failures go through `ApiError`.
    pub success: bool,
    /// Payload.
    pub data: T,
    /// Optional human-readable note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Page metadata for list endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    /// 200 with a payload.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            pagination: None,
            status: StatusCode::OK,
        }
    }

    /// 201 with the created resource.
    pub const fn created(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            pagination: None,
            status: StatusCode::CREATED,
        }
    }

    /// Attaches a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// 200 with one page of rows and its metadata.
    pub fn paginated(page: PageResponse<T>) -> Self {
        Self {
            success: true,
            data: page.data,
            message: None,
            pagination: Some(page.pagination),
            status: StatusCode::OK,
        }
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null` and a message, for deletions.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::ok(()).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
