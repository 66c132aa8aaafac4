//! Endpoints for reading consumption records.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::Duration;

use crate::{
    ApiResponse, AppState, Error,
    api_response::list_response,
    consumption::{
        ConsumptionId, ConsumptionQuery, ReceiveStatus, get_consumption, query_consumptions,
    },
    date_range::{DateRangeParams, end_of_day, start_of_day},
    timezone::local_now,
};

/// How far back the sub type listing looks when no end date is given.
const DEFAULT_SUB_TYPE_WINDOW: Duration = Duration::days(30);

/// The state needed for reading consumption records.
#[derive(Debug, Clone)]
pub struct ListConsumptionsState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Shanghai".
    pub local_timezone: String,
    /// The database connection for managing consumption records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListConsumptionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List every live record, newest first, optionally limited to a date range.
///
/// Dates that do not parse are ignored rather than rejected.
pub async fn list_consumptions_endpoint(
    State(state): State<ListConsumptionsState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Response, Error> {
    let (start_date, end_date) = params.parse_lenient();
    let query = ConsumptionQuery {
        created_from: start_date.map(start_of_day),
        created_until: end_date.map(end_of_day),
        ..Default::default()
    };

    let records = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;
        query_consumptions(&query, &connection)?
    };
    tracing::debug!("Listing {} consumption records", records.len());

    Ok(Json(ApiResponse::data(records)).into_response())
}

/// Get a single live record.
pub async fn get_consumption_endpoint(
    State(state): State<ListConsumptionsState>,
    Path(consumption_id): Path<ConsumptionId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let record = get_consumption(consumption_id, &connection)?;

    Ok(Json(ApiResponse::data(record)).into_response())
}

/// List the records that have not arrived yet, newest first.
pub async fn list_pending_consumptions_endpoint(
    State(state): State<ListConsumptionsState>,
) -> Result<Response, Error> {
    let query = ConsumptionQuery {
        receive_status: Some(ReceiveStatus::Pending),
        ..Default::default()
    };

    list_matching(&state, &query)
}

/// List the received records with the given sub type, newest first.
///
/// Without an `endDate` only the last 30 days are listed, on top of any `startDate`.
pub async fn list_consumptions_by_sub_type_endpoint(
    State(state): State<ListConsumptionsState>,
    Path(sub_type): Path<String>,
    Query(params): Query<DateRangeParams>,
) -> Result<Response, Error> {
    let (start_date, end_date) = params.parse()?;
    let mut created_from = start_date.map(start_of_day);

    if end_date.is_none() {
        let window_start = local_now(&state.local_timezone)? - DEFAULT_SUB_TYPE_WINDOW;
        created_from = created_from.max(Some(window_start));
    }

    let query = ConsumptionQuery {
        receive_status: Some(ReceiveStatus::Received),
        sub_type: Some(sub_type),
        created_from,
        created_until: end_date.map(end_of_day),
        ..Default::default()
    };

    list_matching(&state, &query)
}

/// List the records with the given tag, newest first.
pub async fn list_consumptions_by_tag_endpoint(
    State(state): State<ListConsumptionsState>,
    Path(tag): Path<String>,
) -> Result<Response, Error> {
    let query = ConsumptionQuery {
        tag: Some(tag),
        ..Default::default()
    };

    list_matching(&state, &query)
}

fn list_matching(
    state: &ListConsumptionsState,
    query: &ConsumptionQuery,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let records = query_consumptions(query, &connection)?;

    Ok(list_response(records))
}

#[cfg(test)]
mod list_consumptions_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use time::{Duration, macros::datetime};

    use crate::{
        ApiResponse, Error,
        consumption::{
            ConsumptionRecord, ReceiveStatus, create_consumption, soft_delete_consumption,
            test_utils::new_consumption,
        },
        date_range::DateRangeParams,
        test_utils::{assert_status_ok, get_test_connection, parse_json_body},
        timezone::local_now,
    };

    use super::{
        ListConsumptionsState, get_consumption_endpoint, list_consumptions_by_sub_type_endpoint,
        list_consumptions_by_tag_endpoint, list_consumptions_endpoint,
        list_pending_consumptions_endpoint,
    };

    fn get_state() -> ListConsumptionsState {
        ListConsumptionsState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    fn range(start: Option<&str>, end: Option<&str>) -> Query<DateRangeParams> {
        Query(DateRangeParams {
            start_date: start.map(str::to_owned),
            end_date: end.map(str::to_owned),
        })
    }

    fn ids(records: &[ConsumptionRecord]) -> Vec<i64> {
        records.iter().map(|record| record.id).collect()
    }

    #[tokio::test]
    async fn list_returns_newest_first_without_deleted() {
        let state = get_state();
        let (first, second, deleted) = {
            let connection = state.db_connection.lock().unwrap();
            let first = create_consumption(
                &new_consumption("First", datetime!(2026-01-01 09:00)),
                &connection,
            )
            .unwrap();
            let second = create_consumption(
                &new_consumption("Second", datetime!(2026-01-02 09:00)),
                &connection,
            )
            .unwrap();
            let deleted = create_consumption(
                &new_consumption("Deleted", datetime!(2026-01-03 09:00)),
                &connection,
            )
            .unwrap();
            soft_delete_consumption(deleted.id, &connection).unwrap();
            (first, second, deleted)
        };

        let response = list_consumptions_endpoint(State(state), range(None, None))
            .await
            .unwrap();

        assert_status_ok(&response);
        let body: ApiResponse<Vec<ConsumptionRecord>> = parse_json_body(response).await;
        let records = body.data.unwrap();
        assert_eq!(ids(&records), vec![second.id, first.id]);
        assert!(!ids(&records).contains(&deleted.id));
    }

    #[tokio::test]
    async fn list_end_date_includes_whole_day() {
        let state = get_state();
        let (late_on_last_day, next_day) = {
            let connection = state.db_connection.lock().unwrap();
            let late = create_consumption(
                &new_consumption("Late", datetime!(2026-01-31 23:59:59)),
                &connection,
            )
            .unwrap();
            let next = create_consumption(
                &new_consumption("Next", datetime!(2026-02-01 00:00:00)),
                &connection,
            )
            .unwrap();
            (late, next)
        };

        let response = list_consumptions_endpoint(
            State(state),
            range(Some("2026-01-01"), Some("2026-01-31")),
        )
        .await
        .unwrap();

        let body: ApiResponse<Vec<ConsumptionRecord>> = parse_json_body(response).await;
        let got = ids(&body.data.unwrap());
        assert_eq!(got, vec![late_on_last_day.id]);
        assert!(!got.contains(&next_day.id));
    }

    #[tokio::test]
    async fn list_ignores_invalid_dates() {
        let state = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_consumption(
                &new_consumption("Anything", datetime!(2026-01-01 09:00)),
                &connection,
            )
            .unwrap();
        }

        let response = list_consumptions_endpoint(State(state), range(Some("soon"), Some("later")))
            .await
            .unwrap();

        let body: ApiResponse<Vec<ConsumptionRecord>> = parse_json_body(response).await;
        assert_eq!(body.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_returns_record() {
        let state = get_state();
        let record = create_consumption(
            &new_consumption("Tea", datetime!(2026-01-01 09:00)),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_consumption_endpoint(State(state), Path(record.id))
            .await
            .unwrap();

        let body: ApiResponse<ConsumptionRecord> = parse_json_body(response).await;
        assert_eq!(body.data, Some(record));
    }

    #[tokio::test]
    async fn get_fails_on_missing_record() {
        let state = get_state();

        let result = get_consumption_endpoint(State(state), Path(7)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn pending_lists_only_pending_records_with_count() {
        let state = get_state();
        let pending = {
            let connection = state.db_connection.lock().unwrap();
            create_consumption(
                &new_consumption("Arrived", datetime!(2026-01-01 09:00)),
                &connection,
            )
            .unwrap();
            let mut new = new_consumption("On the way", datetime!(2026-01-02 09:00));
            new.receive_status = ReceiveStatus::Pending;
            create_consumption(&new, &connection).unwrap()
        };

        let response = list_pending_consumptions_endpoint(State(state))
            .await
            .unwrap();

        let body: ApiResponse<Vec<ConsumptionRecord>> = parse_json_body(response).await;
        assert_eq!(body.count, Some(1));
        assert_eq!(body.data, Some(vec![pending]));
    }

    #[tokio::test]
    async fn sub_type_defaults_to_last_30_days() {
        let state = get_state();
        let now = local_now("Etc/UTC").unwrap();
        let (recent, old) = {
            let connection = state.db_connection.lock().unwrap();
            let recent =
                create_consumption(&new_consumption("Recent", now - Duration::days(2)), &connection)
                    .unwrap();
            let old =
                create_consumption(&new_consumption("Old", now - Duration::days(45)), &connection)
                    .unwrap();
            (recent, old)
        };

        let response = list_consumptions_by_sub_type_endpoint(
            State(state),
            Path("Snacks".to_owned()),
            range(None, None),
        )
        .await
        .unwrap();

        let body: ApiResponse<Vec<ConsumptionRecord>> = parse_json_body(response).await;
        assert_eq!(body.count, Some(1));
        let got = ids(&body.data.unwrap());
        assert_eq!(got, vec![recent.id]);
        assert!(!got.contains(&old.id));
    }

    #[tokio::test]
    async fn sub_type_with_end_date_uses_range_and_skips_pending() {
        let state = get_state();
        let (in_range, other_sub_type_id) = {
            let connection = state.db_connection.lock().unwrap();
            let in_range = create_consumption(
                &new_consumption("In range", datetime!(2025-06-10 12:00)),
                &connection,
            )
            .unwrap();
            let mut pending = new_consumption("Pending", datetime!(2025-06-11 12:00));
            pending.receive_status = ReceiveStatus::Pending;
            create_consumption(&pending, &connection).unwrap();
            let mut other = new_consumption("Other", datetime!(2025-06-12 12:00));
            other.sub_type = Some("Fruit".to_owned());
            let other = create_consumption(&other, &connection).unwrap();
            (in_range, other.id)
        };

        let response = list_consumptions_by_sub_type_endpoint(
            State(state),
            Path("Snacks".to_owned()),
            range(Some("2025-06-01"), Some("2025-06-30")),
        )
        .await
        .unwrap();

        let body: ApiResponse<Vec<ConsumptionRecord>> = parse_json_body(response).await;
        let got = ids(&body.data.unwrap());
        assert_eq!(got, vec![in_range.id]);
        assert!(!got.contains(&other_sub_type_id));
    }

    #[tokio::test]
    async fn sub_type_rejects_invalid_dates() {
        let state = get_state();

        let result = list_consumptions_by_sub_type_endpoint(
            State(state),
            Path("Snacks".to_owned()),
            range(Some("2025-13-01"), None),
        )
        .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn tag_lists_matching_records_with_count() {
        let state = get_state();
        let tagged = {
            let connection = state.db_connection.lock().unwrap();
            let mut new = new_consumption("Favourite", datetime!(2026-01-01 09:00));
            new.tag = Some("repurchase".to_owned());
            let tagged = create_consumption(&new, &connection).unwrap();
            create_consumption(
                &new_consumption("Untagged", datetime!(2026-01-02 09:00)),
                &connection,
            )
            .unwrap();
            tagged
        };

        let response =
            list_consumptions_by_tag_endpoint(State(state), Path("repurchase".to_owned()))
                .await
                .unwrap();

        let body: ApiResponse<Vec<ConsumptionRecord>> = parse_json_body(response).await;
        assert_eq!(body.count, Some(1));
        assert_eq!(body.data, Some(vec![tagged]));
    }
}
