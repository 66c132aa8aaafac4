//! The endpoint for deleting a consumption record.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    ApiResponse, AppState, Error,
    consumption::{ConsumptionId, soft_delete_consumption},
};

/// The state needed for deleting a consumption record.
#[derive(Debug, Clone)]
pub struct DeleteConsumptionState {
    /// The database connection for managing consumption records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteConsumptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle a request to delete a consumption record.
///
/// The record is only marked as deleted, it stays in the database.
pub async fn delete_consumption_endpoint(
    State(state): State<DeleteConsumptionState>,
    Path(consumption_id): Path<ConsumptionId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    soft_delete_consumption(consumption_id, &connection)?;
    tracing::info!("Deleted consumption record {consumption_id}");

    Ok(Json(ApiResponse::message("Consumption record deleted")).into_response())
}

#[cfg(test)]
mod delete_consumption_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use time::macros::datetime;

    use crate::{
        ApiResponse, Error,
        consumption::{create_consumption, get_consumption, test_utils::new_consumption},
        test_utils::{assert_status_ok, get_test_connection, parse_json_body},
    };

    use super::{DeleteConsumptionState, delete_consumption_endpoint};

    #[tokio::test]
    async fn deletes_record() {
        let connection = get_test_connection();
        let record = create_consumption(
            &new_consumption("Soap", datetime!(2026-02-01 08:00)),
            &connection,
        )
        .unwrap();
        let state = DeleteConsumptionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_consumption_endpoint(State(state.clone()), Path(record.id))
            .await
            .expect("Could not delete record");

        assert_status_ok(&response);
        let body: ApiResponse<()> = parse_json_body(response).await;
        assert_eq!(body, ApiResponse::message("Consumption record deleted"));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_consumption(record.id, &connection), Err(Error::NotFound));
        let is_deleted: bool = connection
            .query_row(
                "SELECT is_deleted FROM consumption WHERE id = ?1",
                [record.id],
                |row| row.get(0),
            )
            .expect("Deleted record should stay in the database");
        assert!(is_deleted);
    }

    #[tokio::test]
    async fn fails_on_missing_record() {
        let state = DeleteConsumptionState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let result = delete_consumption_endpoint(State(state), Path(1)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}
