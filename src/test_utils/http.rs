use axum::{
    body::{Body, to_bytes},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::db::initialize;

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

/// Read the whole body of `response` and parse it as JSON.
pub(crate) async fn parse_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).unwrap_or_else(|error| {
        panic!(
            "Could not parse response body {:?} as JSON: {error}",
            String::from_utf8_lossy(&body)
        )
    })
}

/// An in-memory database with all of the application's tables.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory");
    initialize(&connection).expect("Could not initialize database");
    connection
}
