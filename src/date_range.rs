//! Query parameters for filtering records by purchase date.

use serde::Deserialize;
use time::{Date, PrimitiveDateTime, Time, macros::time};

use crate::{Error, consumption::USE_DATE_FORMAT};

/// The optional `startDate` and `endDate` query parameters, each formatted as "YYYY-MM-DD".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DateRangeParams {
    /// The first day to include.
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// The last day to include.
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl DateRangeParams {
    /// Parse both dates, failing on the first one that is not a valid date.
    ///
    /// Blank parameters are treated as missing.
    ///
    /// # Errors
    /// Returns [Error::Validation] if either date does not parse.
    pub fn parse(&self) -> Result<(Option<Date>, Option<Date>), Error> {
        let start = parse_param("startDate", self.start_date.as_deref()).transpose()?;
        let end = parse_param("endDate", self.end_date.as_deref()).transpose()?;

        Ok((start, end))
    }

    /// Parse both dates, dropping any that are not valid dates.
    pub fn parse_lenient(&self) -> (Option<Date>, Option<Date>) {
        let lenient = |name: &str, value: Option<&str>| match parse_param(name, value)? {
            Ok(date) => Some(date),
            Err(error) => {
                tracing::warn!("Ignoring date filter: {error}");
                None
            }
        };

        (
            lenient("startDate", self.start_date.as_deref()),
            lenient("endDate", self.end_date.as_deref()),
        )
    }
}

fn parse_param(name: &str, value: Option<&str>) -> Option<Result<Date, Error>> {
    let value = value.map(str::trim).filter(|value| !value.is_empty())?;

    Some(Date::parse(value, USE_DATE_FORMAT).map_err(|_| {
        Error::Validation(format!(
            "invalid {name} \"{value}\", expected a date formatted as YYYY-MM-DD"
        ))
    }))
}

/// The first second of `date`.
pub fn start_of_day(date: Date) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date, Time::MIDNIGHT)
}

/// The last second of `date`, so that a range ending on `date` includes the whole day.
pub fn end_of_day(date: Date) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date, time!(23:59:59))
}
