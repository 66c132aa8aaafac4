//! The endpoint for recording a new purchase.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    ApiResponse, AppState, Error,
    consumption::{ConsumptionData, create_consumption, prepare_new_consumption},
    endpoints::{self, format_endpoint},
    timezone::local_now,
};

/// The state needed for creating a consumption record.
#[derive(Debug, Clone)]
pub struct CreateConsumptionState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Shanghai".
    pub local_timezone: String,
    /// The database connection for managing consumption records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateConsumptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle a request to create a consumption record.
///
/// Responds with 201 and the saved record, including its ID and derived fields.
/// The `Location` header points at the new record.
pub async fn create_consumption_endpoint(
    State(state): State<CreateConsumptionState>,
    Json(data): Json<ConsumptionData>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;
    let new_consumption = prepare_new_consumption(&data, now)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let record = create_consumption(&new_consumption, &connection)?;
    tracing::info!("Created consumption record {}", record.id);

    let location = format_endpoint(endpoints::CONSUMPTION, record.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(ApiResponse::data(record).with_message("Consumption record created")),
    )
        .into_response())
}
