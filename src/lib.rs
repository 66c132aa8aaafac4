//! A backend for tracking personal spending one purchased item at a time.
//!
//! This library provides a JSON REST API over consumption records, the
//! lookup tables for purchase channels, bill categories and sub-categories,
//! and the statistics behind the spending pie chart.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod api_response;
mod app_state;
mod consumption;
mod date_range;
mod db;
mod endpoints;
mod logging;
mod lookup;
mod not_found;
mod routing;
mod statistics;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use api_response::ApiResponse;
pub use app_state::AppState;
pub use consumption::{
    ConsumptionData, ConsumptionId, ConsumptionQuery, ConsumptionRecord, NewConsumption,
    ReceiveStatus, StatisticalStatus, apply_update, compute_daily_average_price,
    compute_min_unit_price, compute_statistical_status, create_consumption, get_consumption,
    get_used_sub_types, parse_purchase_time, prepare_new_consumption, query_consumptions,
    soft_delete_consumption, update_consumption,
};
pub use db::initialize as initialize_db;
pub use endpoints::format_endpoint;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use lookup::{
    Channel, LookupEntry, LookupId, LookupKind, LookupListing, LookupName, MainType, SubType,
    create_entry, delete_entry, get_entries, get_entry, update_entry,
};
pub use routing::build_router;
pub use statistics::{ChartData, get_spending_by_main_type};
pub use timezone::{get_local_offset, local_now};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent input that breaks a rule, e.g. a blank required field
    /// or a date in an unsupported format.
    ///
    /// The string explains the problem and is shown to the client.
    #[error("{0}")]
    Validation(String),

    /// An empty string was used to name a channel, main type or sub type.
    #[error("name cannot be empty")]
    EmptyName,

    /// A channel, main type or sub type with this name already exists.
    #[error("\"{0}\" already exists")]
    DuplicateName(String),

    /// The requested resource was not found.
    ///
    /// For consumption records this includes records that have been deleted.
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Validation(_) | Error::EmptyName | Error::DuplicateName(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidTimezone(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match self {
            // SQL errors are not intended to be shown to the client.
            Error::SqlError(error) => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            Error::InvalidTimezone(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            error => error.to_string(),
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}
