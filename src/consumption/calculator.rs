//! Calculations for the fields of a consumption record that are derived from
//! other fields.
//!
//! None of these functions fail: a zero denominator, an empty use period or
//! a date that cannot be parsed all produce zero.

use rust_decimal::{Decimal, RoundingStrategy};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::consumption::{ReceiveStatus, StatisticalStatus};

/// The format of the dates an item was first and last used on.
pub(crate) const USE_DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// The price of one smallest usable unit: `total_price / (quantity * unit_coefficient)`.
///
/// `unit_coefficient` defaults to one. The result is rounded half-up to two
/// decimal places, and is zero when there are no units to divide by.
pub fn compute_min_unit_price(
    total_price: Decimal,
    quantity: Decimal,
    unit_coefficient: Option<Decimal>,
) -> Decimal {
    quantity
        .checked_mul(unit_coefficient.unwrap_or(Decimal::ONE))
        .filter(|unit_count| !unit_count.is_zero())
        .and_then(|unit_count| total_price.checked_div(unit_count))
        .map(round_price)
        .unwrap_or(Decimal::ZERO)
}

/// The total price spread over the days an item was used, counting both the
/// first and the last day.
///
/// Dates are expected as "YYYY-MM-DD". Text that does not parse, or an end
/// date before the start date, gives zero.
pub fn compute_daily_average_price(
    total_price: Decimal,
    start_date: &str,
    end_date: &str,
) -> Decimal {
    let start_date = Date::parse(start_date.trim(), USE_DATE_FORMAT).ok();
    let end_date = Date::parse(end_date.trim(), USE_DATE_FORMAT).ok();

    daily_average_price(total_price, start_date, end_date)
}

/// Typed counterpart of [compute_daily_average_price].
pub(crate) fn daily_average_price(
    total_price: Decimal,
    start_date: Option<Date>,
    end_date: Option<Date>,
) -> Decimal {
    let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
        return Decimal::ZERO;
    };

    let days_used = (end_date - start_date).whole_days() + 1;

    if days_used <= 0 {
        return Decimal::ZERO;
    }

    total_price
        .checked_div(Decimal::from(days_used))
        .map(round_price)
        .unwrap_or(Decimal::ZERO)
}

/// "received" counts toward spend totals, anything else does not.
pub fn compute_statistical_status(receive_status: &str) -> StatisticalStatus {
    if receive_status == ReceiveStatus::Received.as_str() {
        StatisticalStatus::Counted
    } else {
        StatisticalStatus::NotCounted
    }
}

fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}


#[cfg(test)]
mod daily_average_price_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use super::{compute_daily_average_price, daily_average_price};

    #[test]
    fn counts_both_endpoints() {
        let got = compute_daily_average_price(dec!(300.0), "2024-01-01", "2024-01-10");

        assert_eq!(got, dec!(30.0));
    }

    #[test]
    fn same_day_counts_as_one_day() {
        let got = compute_daily_average_price(dec!(12.5), "2024-03-01", "2024-03-01");

        assert_eq!(got, dec!(12.5));
    }

    #[test]
    fn end_before_start_gives_zero() {
        let got = compute_daily_average_price(dec!(100.0), "2024-01-05", "2024-01-01");

        assert_eq!(got, Decimal::ZERO);
    }

    #[test]
    fn unparseable_date_gives_zero() {
        assert_eq!(
            compute_daily_average_price(dec!(100.0), "bad-date", "2024-01-01"),
            Decimal::ZERO
        );
        assert_eq!(
            compute_daily_average_price(dec!(100.0), "2024-01-01", ""),
            Decimal::ZERO
        );
    }

    #[test]
    fn rounds_half_up_to_two_places() {
        let got = compute_daily_average_price(dec!(100), "2024-01-01", "2024-01-03");

        assert_eq!(got, dec!(33.33));
    }

    #[test]
    fn spans_leap_day() {
        let got = daily_average_price(
            dec!(58),
            Some(date!(2024 - 02 - 01)),
            Some(date!(2024 - 02 - 29)),
        );

        assert_eq!(got, dec!(2));
    }

    #[test]
    fn missing_date_gives_zero() {
        let got = daily_average_price(dec!(10), Some(date!(2024 - 01 - 01)), None);

        assert_eq!(got, Decimal::ZERO);
    }
}

#[cfg(test)]
mod statistical_status_tests {
    use crate::consumption::StatisticalStatus;

    use super::compute_statistical_status;

    #[test]
    fn received_is_counted() {
        assert_eq!(
            compute_statistical_status("received"),
            StatisticalStatus::Counted
        );
    }

    #[test]
    fn everything_else_is_not_counted() {
        for status in ["pending", "", "RECEIVED", "lost"] {
            assert_eq!(
                compute_statistical_status(status),
                StatisticalStatus::NotCounted,
                "status {status:?}"
            );
        }
    }
}
