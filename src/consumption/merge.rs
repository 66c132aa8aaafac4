//! Turns client input into validated consumption records.
//!
//! Creating a record checks the required fields and fills in defaults.
//! Updating a record merges the supplied fields over the stored ones. Both
//! paths then recompute the derived fields, so the stored values can never
//! disagree with the fields they are derived from.

use rust_decimal::Decimal;
use time::{
    Date, PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Error,
    consumption::{
        ConsumptionData, ConsumptionRecord, NewConsumption,
        calculator::{
            USE_DATE_FORMAT, compute_min_unit_price, compute_statistical_status,
            daily_average_price,
        },
    },
};

/// The accepted purchase time formats, tried in order.
const PURCHASE_TIME_FORMATS: [&[BorrowedFormatItem<'_>]; 3] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];

/// Parse a purchase time using the first accepted format that matches.
///
/// # Errors
/// Returns [Error::Validation] if no format matches.
pub fn parse_purchase_time(text: &str) -> Result<PrimitiveDateTime, Error> {
    let trimmed = text.trim();

    PURCHASE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(trimmed, format).ok())
        .ok_or_else(|| {
            Error::Validation(format!(
                "invalid purchase time \"{text}\", expected YYYY-MM-DDTHH:MM, \
                YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS"
            ))
        })
}

/// Parse a first or last use date formatted as "YYYY-MM-DD".
///
/// # Errors
/// Returns [Error::Validation] naming `field` if the date does not parse.
pub(crate) fn parse_use_date(field: &str, text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), USE_DATE_FORMAT).map_err(|_| {
        Error::Validation(format!(
            "invalid {field} \"{text}\", expected a date formatted as YYYY-MM-DD"
        ))
    })
}

/// Validate the input for a new record, apply defaults and compute the derived fields.
///
/// `now` is used as the purchase time when the client does not supply one.
///
/// # Errors
/// Returns [Error::Validation] if a required field is missing or blank, a
/// number is negative, or a date does not parse.
pub fn prepare_new_consumption(
    data: &ConsumptionData,
    now: PrimitiveDateTime,
) -> Result<NewConsumption, Error> {
    let content = required_text("content", data.content.as_deref())?;
    let channel = required_text("channel", data.channel.as_deref())?;
    let main_type = required_text("main_type", data.main_type.as_deref())?;
    let sub_type = required_text("sub_type", data.sub_type.as_deref())?;

    let quantity = non_negative("quantity", data.quantity.unwrap_or(Decimal::ONE))?;
    let total_price = non_negative("total_price", data.total_price.unwrap_or(Decimal::ZERO))?;
    let unit_coefficient = non_negative(
        "unit_coefficient",
        data.unit_coefficient.unwrap_or(Decimal::ONE),
    )?;
    let receive_status = data.receive_status.unwrap_or_default();

    let create_time = match supplied(data.purchase_time.as_deref()) {
        Some(purchase_time) => parse_purchase_time(purchase_time)?,
        None => now,
    };
    let start_use_time = supplied(data.start_use_time.as_deref())
        .map(|text| parse_use_date("start_use_time", text))
        .transpose()?;
    let end_use_time = supplied(data.end_use_time.as_deref())
        .map(|text| parse_use_date("end_use_time", text))
        .transpose()?;

    Ok(NewConsumption {
        content,
        quantity,
        total_price,
        channel,
        main_type,
        sub_type: Some(sub_type),
        unit_coefficient,
        receive_status,
        create_time,
        statistical_status: compute_statistical_status(receive_status.as_str()),
        min_unit_price: compute_min_unit_price(total_price, quantity, Some(unit_coefficient)),
        tag: data.tag.clone(),
        evaluate: data.evaluate.clone(),
        start_use_time,
        end_use_time,
        daily_average_price: daily_average_price(total_price, start_use_time, end_use_time),
        pickup_code: data.pickup_code.clone(),
    })
}

/// Merge `data` over `existing` field by field and recompute the derived fields.
///
/// Fields that are `None` in `data` keep their current value. The minimum
/// unit price and statistical status are always recomputed. The daily
/// average price is recomputed whenever both use dates are set after the
/// merge, otherwise the stored value is kept.
///
/// The merge only depends on its inputs, so applying the same update twice
/// gives the same record.
///
/// # Errors
/// Returns [Error::Validation] under the same rules as [prepare_new_consumption].
pub fn apply_update(
    existing: &ConsumptionRecord,
    data: &ConsumptionData,
) -> Result<ConsumptionRecord, Error> {
    let mut record = existing.clone();

    if let Some(content) = data.content.as_deref() {
        record.content = required_text("content", Some(content))?;
    }
    if let Some(quantity) = data.quantity {
        record.quantity = non_negative("quantity", quantity)?;
    }
    if let Some(total_price) = data.total_price {
        record.total_price = non_negative("total_price", total_price)?;
    }
    if let Some(channel) = data.channel.as_deref() {
        record.channel = required_text("channel", Some(channel))?;
    }
    if let Some(main_type) = data.main_type.as_deref() {
        record.main_type = required_text("main_type", Some(main_type))?;
    }
    if let Some(sub_type) = data.sub_type.as_deref() {
        record.sub_type = Some(required_text("sub_type", Some(sub_type))?);
    }
    if let Some(unit_coefficient) = data.unit_coefficient {
        record.unit_coefficient = non_negative("unit_coefficient", unit_coefficient)?;
    }
    if let Some(receive_status) = data.receive_status {
        record.receive_status = receive_status;
    }
    if let Some(purchase_time) = supplied(data.purchase_time.as_deref()) {
        record.create_time = parse_purchase_time(purchase_time)?;
    }
    if let Some(tag) = &data.tag {
        record.tag = Some(tag.clone());
    }
    if let Some(evaluate) = &data.evaluate {
        record.evaluate = Some(evaluate.clone());
    }
    if let Some(start_use_time) = supplied(data.start_use_time.as_deref()) {
        record.start_use_time = Some(parse_use_date("start_use_time", start_use_time)?);
    }
    if let Some(end_use_time) = supplied(data.end_use_time.as_deref()) {
        record.end_use_time = Some(parse_use_date("end_use_time", end_use_time)?);
    }
    if let Some(pickup_code) = &data.pickup_code {
        record.pickup_code = Some(pickup_code.clone());
    }

    recompute_derived_fields(&mut record);

    Ok(record)
}

fn recompute_derived_fields(record: &mut ConsumptionRecord) {
    record.min_unit_price = compute_min_unit_price(
        record.total_price,
        record.quantity,
        Some(record.unit_coefficient),
    );
    record.statistical_status = compute_statistical_status(record.receive_status.as_str());

    if record.start_use_time.is_some() && record.end_use_time.is_some() {
        record.daily_average_price = daily_average_price(
            record.total_price,
            record.start_use_time,
            record.end_use_time,
        );
    }
}

fn required_text(field: &str, value: Option<&str>) -> Result<String, Error> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_owned()),
        _ => Err(Error::Validation(format!("{field} cannot be empty"))),
    }
}

fn non_negative(field: &str, value: Decimal) -> Result<Decimal, Error> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(Error::Validation(format!("{field} cannot be negative")))
    } else {
        Ok(value)
    }
}

/// Blank optional text is treated the same as a missing field.
fn supplied(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
