//! The response for routes that do not exist.

use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::ApiResponse;

/// Respond to a request for an unknown route with a 404 JSON envelope.
pub async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");

    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(format!("No route for {}", uri.path()))),
    )
        .into_response()
}
