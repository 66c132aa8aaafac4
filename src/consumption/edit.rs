//! The endpoint for updating a consumption record.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    ApiResponse, AppState, Error,
    consumption::{
        ConsumptionData, ConsumptionId, apply_update, get_consumption, update_consumption,
    },
};

/// The state needed for updating a consumption record.
#[derive(Debug, Clone)]
pub struct UpdateConsumptionState {
    /// The database connection for managing consumption records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateConsumptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle a partial update to a consumption record.
///
/// Only the fields present in the body are changed. The read, merge and write
/// happen in one transaction and the response carries the record as saved.
pub async fn update_consumption_endpoint(
    State(state): State<UpdateConsumptionState>,
    Path(consumption_id): Path<ConsumptionId>,
    Json(data): Json<ConsumptionData>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = connection.unchecked_transaction()?;
    let existing = get_consumption(consumption_id, &transaction)?;
    let updated = apply_update(&existing, &data)?;
    update_consumption(&updated, &transaction)?;
    transaction.commit()?;

    tracing::info!("Updated consumption record {consumption_id}");

    Ok(Json(ApiResponse::data(updated).with_message("Consumption record updated")).into_response())
}

#[cfg(test)]
mod update_consumption_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
    };
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        ApiResponse, Error,
        consumption::{
            ConsumptionData, ConsumptionRecord, ReceiveStatus, StatisticalStatus,
            create_consumption, get_consumption, soft_delete_consumption,
            test_utils::new_consumption,
        },
        test_utils::{assert_status_ok, get_test_connection, parse_json_body},
    };

    use super::{UpdateConsumptionState, update_consumption_endpoint};

    fn get_state_with_record() -> (UpdateConsumptionState, ConsumptionRecord) {
        let connection = get_test_connection();
        let record = create_consumption(
            &new_consumption("Rice", datetime!(2026-02-01 08:00)),
            &connection,
        )
        .expect("Could not create test record");

        (
            UpdateConsumptionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            record,
        )
    }

    #[tokio::test]
    async fn updates_only_supplied_fields() {
        let (state, record) = get_state_with_record();
        let data = ConsumptionData {
            quantity: Some(dec!(5)),
            ..Default::default()
        };

        let response =
            update_consumption_endpoint(State(state.clone()), Path(record.id), Json(data))
                .await
                .expect("Could not update record");

        assert_status_ok(&response);
        let body: ApiResponse<ConsumptionRecord> = parse_json_body(response).await;
        let updated = body.data.unwrap();
        assert_eq!(updated.content, "Rice");
        assert_eq!(updated.quantity, dec!(5));
        assert_eq!(updated.min_unit_price, dec!(2.5));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_consumption(record.id, &connection), Ok(updated));
    }

    #[tokio::test]
    async fn recomputes_statistical_status() {
        let (state, record) = get_state_with_record();
        let data = ConsumptionData {
            receive_status: Some(ReceiveStatus::Pending),
            ..Default::default()
        };

        let response = update_consumption_endpoint(State(state), Path(record.id), Json(data))
            .await
            .expect("Could not update record");

        let body: ApiResponse<ConsumptionRecord> = parse_json_body(response).await;
        assert_eq!(
            body.data.unwrap().statistical_status,
            StatisticalStatus::NotCounted
        );
    }

    #[tokio::test]
    async fn fails_on_missing_record() {
        let (state, record) = get_state_with_record();

        let result = update_consumption_endpoint(
            State(state),
            Path(record.id + 1),
            Json(ConsumptionData::default()),
        )
        .await;

        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn fails_on_deleted_record() {
        let (state, record) = get_state_with_record();
        soft_delete_consumption(record.id, &state.db_connection.lock().unwrap()).unwrap();

        let result = update_consumption_endpoint(
            State(state),
            Path(record.id),
            Json(ConsumptionData::default()),
        )
        .await;

        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn invalid_update_leaves_record_unchanged() {
        let (state, record) = get_state_with_record();
        let data = ConsumptionData {
            quantity: Some(dec!(4)),
            end_use_time: Some("next week".to_owned()),
            ..Default::default()
        };

        let result =
            update_consumption_endpoint(State(state.clone()), Path(record.id), Json(data)).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_consumption(record.id, &connection), Ok(record));
    }
}
