//! The JSON envelope shared by every API response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The body of every JSON response, e.g. `{"success": true, "data": [...], "count": 2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// A human readable message, set for mutations and failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The payload of a successful request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// The number of items in `data` for list endpoints that report it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            count: None,
        }
    }

    /// Attach a message to the response.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }

    /// Attach an item count to the response.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl ApiResponse<()> {
    /// A successful response with only a message.
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_owned()),
            data: None,
            count: None,
        }
    }

    /// A failed response with an explanation for the client.
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
            data: None,
            count: None,
        }
    }
}

/// Build a list response where `count` is the length of `items`.
pub(crate) fn list_response<T: Serialize>(items: Vec<T>) -> Response {
    let count = items.len();

    (
        StatusCode::OK,
        Json(ApiResponse::data(items).with_count(count)),
    )
        .into_response()
}
