//! Spending totals per main type for the statistics pie chart.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, named_params};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::{
    ApiResponse, AppState, Error,
    consumption::{ReceiveStatus, create_time_to_sql, get_parsed},
    date_range::{DateRangeParams, end_of_day, start_of_day},
};

/// The data for a pie chart, where `values[i]` is the total spent on `categories[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// The main types, in alphabetical order.
    pub categories: Vec<String>,
    /// The total price of the received records for each main type.
    pub values: Vec<Decimal>,
}

/// The state needed for the statistics endpoint.
#[derive(Debug, Clone)]
pub struct StatisticsState {
    /// The database connection for reading consumption records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatisticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Sum the spending per main type between `startDate` and `endDate`, inclusive.
///
/// Both dates are required. Pending and deleted records are not counted.
pub async fn get_statistics_endpoint(
    State(state): State<StatisticsState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Response, Error> {
    let (Some(start_date), Some(end_date)) = params.parse()? else {
        return Err(Error::Validation(
            "startDate and endDate are both required".to_owned(),
        ));
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let chart_data = get_spending_by_main_type(
        start_of_day(start_date),
        end_of_day(end_date),
        &connection,
    )?;
    tracing::debug!(
        "Spending from {start_date} to {end_date} covers {} main types",
        chart_data.categories.len()
    );

    Ok(Json(ApiResponse::data(chart_data)).into_response())
}

/// Total the price of received, live records bought between `from` and `until`
/// (inclusive) for each main type.
pub fn get_spending_by_main_type(
    from: PrimitiveDateTime,
    until: PrimitiveDateTime,
    connection: &Connection,
) -> Result<ChartData, Error> {
    let mut statement = connection.prepare(
        "SELECT main_type, total_price FROM consumption
        WHERE is_deleted = 0
            AND receive_status = :receive_status
            AND create_time BETWEEN :from AND :until",
    )?;
    let rows = statement.query_map(
        named_params! {
            ":receive_status": ReceiveStatus::Received.as_str(),
            ":from": create_time_to_sql(from),
            ":until": create_time_to_sql(until),
        },
        |row| Ok((row.get::<_, String>(0)?, get_parsed::<Decimal>(row, 1)?)),
    )?;

    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in rows {
        let (main_type, total_price) = row?;
        let total = totals.entry(main_type).or_default();
        *total = total.saturating_add(total_price);
    }

    let (categories, values): (Vec<String>, Vec<Decimal>) = totals.into_iter().unzip();

    Ok(ChartData { categories, values })
}
