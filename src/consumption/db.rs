//! Database operations for consumption records.
//!
//! Prices and quantities are stored as decimal text so that they round-trip
//! exactly. Purchase times are stored as "YYYY-MM-DD HH:MM:SS", which sorts
//! and compares correctly as text.

use std::str::FromStr;

use rusqlite::{Connection, Row, ToSql, named_params, types::Type};
use time::{
    PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Error,
    consumption::{ConsumptionId, ConsumptionRecord, NewConsumption, ReceiveStatus},
};

const CREATE_TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const COLUMNS: &str = "id, content, quantity, total_price, channel, main_type, sub_type, \
    unit_coefficient, receive_status, create_time, statistical_status, min_unit_price, tag, \
    evaluate, start_use_time, end_use_time, daily_average_price, is_deleted, pickup_code";

/// Filters for listing consumption records.
///
/// Deleted records are always excluded. Every other filter is skipped when `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionQuery {
    /// Only include records with this receive status.
    pub receive_status: Option<ReceiveStatus>,
    /// Only include records with this sub type.
    pub sub_type: Option<String>,
    /// Only include records with this tag.
    pub tag: Option<String>,
    /// Only include records bought at or after this time.
    pub created_from: Option<PrimitiveDateTime>,
    /// Only include records bought at or before this time.
    pub created_until: Option<PrimitiveDateTime>,
}

/// Save a new record and return it with its generated ID.
pub fn create_consumption(
    new: &NewConsumption,
    connection: &Connection,
) -> Result<ConsumptionRecord, Error> {
    let query = format!(
        "INSERT INTO consumption (content, quantity, total_price, channel, main_type, sub_type, \
            unit_coefficient, receive_status, create_time, statistical_status, min_unit_price, \
            tag, evaluate, start_use_time, end_use_time, daily_average_price, is_deleted, \
            pickup_code)
        VALUES (:content, :quantity, :total_price, :channel, :main_type, :sub_type, \
            :unit_coefficient, :receive_status, :create_time, :statistical_status, \
            :min_unit_price, :tag, :evaluate, :start_use_time, :end_use_time, \
            :daily_average_price, 0, :pickup_code)
        RETURNING {COLUMNS}"
    );

    let record = connection.prepare(&query)?.query_row(
        named_params! {
            ":content": new.content,
            ":quantity": new.quantity.to_string(),
            ":total_price": new.total_price.to_string(),
            ":channel": new.channel,
            ":main_type": new.main_type,
            ":sub_type": new.sub_type,
            ":unit_coefficient": new.unit_coefficient.to_string(),
            ":receive_status": new.receive_status.as_str(),
            ":create_time": create_time_to_sql(new.create_time),
            ":statistical_status": new.statistical_status.as_str(),
            ":min_unit_price": new.min_unit_price.to_string(),
            ":tag": new.tag,
            ":evaluate": new.evaluate,
            ":start_use_time": new.start_use_time,
            ":end_use_time": new.end_use_time,
            ":daily_average_price": new.daily_average_price.to_string(),
            ":pickup_code": new.pickup_code,
        },
        map_row,
    )?;

    Ok(record)
}

/// Retrieve a record that has not been deleted.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a live record.
pub fn get_consumption(
    id: ConsumptionId,
    connection: &Connection,
) -> Result<ConsumptionRecord, Error> {
    connection
        .prepare(&format!(
            "SELECT {COLUMNS} FROM consumption WHERE id = :id AND is_deleted = 0"
        ))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the records matching `query`, most recently bought first.
pub fn query_consumptions(
    query: &ConsumptionQuery,
    connection: &Connection,
) -> Result<Vec<ConsumptionRecord>, Error> {
    let created_from = query.created_from.map(create_time_to_sql);
    let created_until = query.created_until.map(create_time_to_sql);
    let receive_status = query.receive_status.map(|status| status.as_str());

    let mut clauses = vec!["is_deleted = 0"];
    let mut params: Vec<(&str, &dyn ToSql)> = Vec::new();

    if let Some(receive_status) = &receive_status {
        clauses.push("receive_status = :receive_status");
        params.push((":receive_status", receive_status));
    }
    if let Some(sub_type) = &query.sub_type {
        clauses.push("sub_type = :sub_type");
        params.push((":sub_type", sub_type));
    }
    if let Some(tag) = &query.tag {
        clauses.push("tag = :tag");
        params.push((":tag", tag));
    }
    if let Some(created_from) = &created_from {
        clauses.push("create_time >= :created_from");
        params.push((":created_from", created_from));
    }
    if let Some(created_until) = &created_until {
        clauses.push("create_time <= :created_until");
        params.push((":created_until", created_until));
    }

    // Order by ID as well so that records bought at the same time keep a stable order.
    let sql = format!(
        "SELECT {COLUMNS} FROM consumption WHERE {} ORDER BY create_time DESC, id DESC",
        clauses.join(" AND ")
    );

    connection
        .prepare(&sql)?
        .query_map(params.as_slice(), map_row)?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

/// Overwrite every stored field of a live record with the values in `record`.
///
/// # Errors
/// Returns [Error::NotFound] if the record does not exist or has been deleted.
pub fn update_consumption(
    record: &ConsumptionRecord,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE consumption SET \
            content = :content, \
            quantity = :quantity, \
            total_price = :total_price, \
            channel = :channel, \
            main_type = :main_type, \
            sub_type = :sub_type, \
            unit_coefficient = :unit_coefficient, \
            receive_status = :receive_status, \
            create_time = :create_time, \
            statistical_status = :statistical_status, \
            min_unit_price = :min_unit_price, \
            tag = :tag, \
            evaluate = :evaluate, \
            start_use_time = :start_use_time, \
            end_use_time = :end_use_time, \
            daily_average_price = :daily_average_price, \
            pickup_code = :pickup_code \
        WHERE id = :id AND is_deleted = 0",
        named_params! {
            ":content": record.content,
            ":quantity": record.quantity.to_string(),
            ":total_price": record.total_price.to_string(),
            ":channel": record.channel,
            ":main_type": record.main_type,
            ":sub_type": record.sub_type,
            ":unit_coefficient": record.unit_coefficient.to_string(),
            ":receive_status": record.receive_status.as_str(),
            ":create_time": create_time_to_sql(record.create_time),
            ":statistical_status": record.statistical_status.as_str(),
            ":min_unit_price": record.min_unit_price.to_string(),
            ":tag": record.tag,
            ":evaluate": record.evaluate,
            ":start_use_time": record.start_use_time,
            ":end_use_time": record.end_use_time,
            ":daily_average_price": record.daily_average_price.to_string(),
            ":pickup_code": record.pickup_code,
            ":id": record.id,
        },
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Mark a record as deleted. The row stays in the database.
///
/// # Errors
/// Returns [Error::NotFound] if the record does not exist or is already deleted.
pub fn soft_delete_consumption(id: ConsumptionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE consumption SET is_deleted = 1 WHERE id = ?1 AND is_deleted = 0",
        [id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the distinct sub types used by live records, in order of first use.
pub fn get_used_sub_types(connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(
            "SELECT sub_type FROM consumption \
            WHERE is_deleted = 0 AND sub_type IS NOT NULL AND sub_type <> '' \
            GROUP BY sub_type ORDER BY MIN(id)",
        )?
        .query_map([], |row| row.get(0))?
        .map(|maybe_name| maybe_name.map_err(|error| error.into()))
        .collect()
}

/// Create the consumption table and indexes.
pub fn create_consumption_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS consumption (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            quantity TEXT NOT NULL,
            total_price TEXT NOT NULL,
            channel TEXT NOT NULL,
            main_type TEXT NOT NULL,
            sub_type TEXT,
            unit_coefficient TEXT NOT NULL DEFAULT '1',
            receive_status TEXT NOT NULL DEFAULT 'received',
            create_time TEXT NOT NULL,
            statistical_status TEXT NOT NULL DEFAULT 'counted',
            min_unit_price TEXT NOT NULL DEFAULT '0',
            tag TEXT,
            evaluate TEXT,
            start_use_time TEXT,
            end_use_time TEXT,
            daily_average_price TEXT NOT NULL DEFAULT '0',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            pickup_code TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_consumption_create_time ON consumption(create_time);
        CREATE INDEX IF NOT EXISTS idx_consumption_sub_type ON consumption(sub_type);",
    )?;

    Ok(())
}

pub(crate) fn create_time_to_sql(create_time: PrimitiveDateTime) -> String {
    format!(
        "{} {:02}:{:02}:{:02}",
        create_time.date(),
        create_time.hour(),
        create_time.minute(),
        create_time.second()
    )
}

/// Read a column holding text that parses into `T`, e.g. a decimal or a status.
pub(crate) fn get_parsed<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(index)?;

    text.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

fn get_create_time(row: &Row, index: usize) -> Result<PrimitiveDateTime, rusqlite::Error> {
    let text: String = row.get(index)?;

    PrimitiveDateTime::parse(&text, CREATE_TIME_FORMAT).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

fn map_row(row: &Row) -> Result<ConsumptionRecord, rusqlite::Error> {
    Ok(ConsumptionRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        quantity: get_parsed(row, 2)?,
        total_price: get_parsed(row, 3)?,
        channel: row.get(4)?,
        main_type: row.get(5)?,
        sub_type: row.get(6)?,
        unit_coefficient: get_parsed(row, 7)?,
        receive_status: get_parsed(row, 8)?,
        create_time: get_create_time(row, 9)?,
        statistical_status: get_parsed(row, 10)?,
        min_unit_price: get_parsed(row, 11)?,
        tag: row.get(12)?,
        evaluate: row.get(13)?,
        start_use_time: row.get(14)?,
        end_use_time: row.get(15)?,
        daily_average_price: get_parsed(row, 16)?,
        is_deleted: row.get(17)?,
        pickup_code: row.get(18)?,
    })
}
