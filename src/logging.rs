//! Middleware for logging requests and responses.

use axum::{
    Json,
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::ApiResponse;

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::failure("could not read request body".to_owned())),
            )
                .into_response();
        }
    };
    log_body("Received request", &parts, &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_body("Sending response", &parts, &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    to_bytes(body, usize::MAX).await
}

fn log_body(label: &str, parts: &impl std::fmt::Debug, body: &[u8]) {
    let body = String::from_utf8_lossy(body);

    match truncate(&body, LOG_BODY_LENGTH_LIMIT) {
        Some(prefix) => {
            tracing::info!("{label}: {parts:#?}\nbody: {prefix}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{label}: {parts:#?}\nbody: {body:?}"),
    }
}

/// The first `limit` characters of `text`, or `None` if `text` is not longer than that.
fn truncate(text: &str, limit: usize) -> Option<&str> {
    text.char_indices()
        .nth(limit)
        .map(|(byte_index, _)| &text[..byte_index])
}

#[cfg(test)]
mod logging_tests {
    use axum::{Router, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, truncate};

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(truncate("hello", LOG_BODY_LENGTH_LIMIT), None);
    }

    #[test]
    fn truncates_on_char_boundary() {
        let text = "酸奶".repeat(LOG_BODY_LENGTH_LIMIT);

        let got = truncate(&text, LOG_BODY_LENGTH_LIMIT).expect("Text should be truncated");

        assert_eq!(got.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert!(text.starts_with(got));
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");
        let body = format!("{{\"content\": \"{}\"}}", "牛奶".repeat(100));

        let response = server.post("/echo").text(&body).await;

        response.assert_status(StatusCode::OK);
        response.assert_text(body);
    }
}
