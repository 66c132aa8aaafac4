use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of a canonical timezone, e.g. "Asia/Shanghai".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current wall clock time in `canonical_timezone`, to the second.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the timezone is not recognised.
pub fn local_now(canonical_timezone: &str) -> Result<PrimitiveDateTime, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;
    let now = OffsetDateTime::now_utc().to_offset(offset);
    let now = PrimitiveDateTime::new(now.date(), now.time());

    Ok(now.replace_nanosecond(0).unwrap_or(now))
}
