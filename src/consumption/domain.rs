//! Core consumption record domain types.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};

use crate::Error;

/// Database identifier for a consumption record.
pub type ConsumptionId = i64;

time::serde::format_description!(
    create_time_format,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second]"
);

time::serde::format_description!(use_date_format, Date, "[year]-[month]-[day]");

/// Whether a purchased item has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReceiveStatus {
    /// The item has been delivered or picked up.
    #[default]
    Received,
    /// The item is still on its way.
    Pending,
}

impl ReceiveStatus {
    /// The text stored in the database and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiveStatus::Received => "received",
            ReceiveStatus::Pending => "pending",
        }
    }
}

impl FromStr for ReceiveStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(ReceiveStatus::Received),
            "pending" => Ok(ReceiveStatus::Pending),
            other => Err(Error::Validation(format!(
                "unknown receive status \"{other}\", expected \"received\" or \"pending\""
            ))),
        }
    }
}

impl Display for ReceiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a record counts toward aggregate spend totals.
///
/// Always derived from [ReceiveStatus], see [crate::compute_statistical_status].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatisticalStatus {
    /// The record is included in totals.
    Counted,
    /// The record is excluded from totals.
    NotCounted,
}

impl StatisticalStatus {
    /// The text stored in the database and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticalStatus::Counted => "counted",
            StatisticalStatus::NotCounted => "not-counted",
        }
    }
}

impl FromStr for StatisticalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counted" => Ok(StatisticalStatus::Counted),
            "not-counted" => Ok(StatisticalStatus::NotCounted),
            other => Err(Error::Validation(format!(
                "unknown statistical status \"{other}\""
            ))),
        }
    }
}

impl Display for StatisticalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One purchased item tracked for spending analysis.
///
/// Records are never physically removed, deleting one sets `is_deleted` and
/// every read query skips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// The ID of the record, never reused.
    pub id: ConsumptionId,
    /// What was bought.
    pub content: String,
    /// How many purchased units were bought.
    pub quantity: Decimal,
    /// The price paid for all units.
    pub total_price: Decimal,
    /// Where the item was bought, e.g. a shop or website.
    pub channel: String,
    /// The bill category.
    pub main_type: String,
    /// The sub-category used for price history lookups.
    pub sub_type: Option<String>,
    /// How many smallest usable units one purchased unit contains,
    /// e.g. a pack of 5 sheets has a coefficient of 5.
    pub unit_coefficient: Decimal,
    /// Whether the item has arrived.
    pub receive_status: ReceiveStatus,
    /// When the item was bought.
    #[serde(with = "create_time_format")]
    pub create_time: PrimitiveDateTime,
    /// Derived from `receive_status`.
    pub statistical_status: StatisticalStatus,
    /// The price of one smallest usable unit.
    pub min_unit_price: Decimal,
    /// A verdict such as "repurchase", "avoid" or "undecided".
    pub tag: Option<String>,
    /// A free text review.
    pub evaluate: Option<String>,
    /// The first day the item was used.
    #[serde(default, with = "use_date_format::option")]
    pub start_use_time: Option<Date>,
    /// The last day the item was used.
    #[serde(default, with = "use_date_format::option")]
    pub end_use_time: Option<Date>,
    /// The total price spread over the days the item was used.
    pub daily_average_price: Decimal,
    /// Whether the record has been deleted.
    pub is_deleted: bool,
    /// The code for collecting the parcel.
    pub pickup_code: Option<String>,
}

/// A validated record that has not been saved yet.
///
/// Use [crate::consumption::prepare_new_consumption] to build one from
/// client input so that the derived fields are filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConsumption {
    pub content: String,
    pub quantity: Decimal,
    pub total_price: Decimal,
    pub channel: String,
    pub main_type: String,
    pub sub_type: Option<String>,
    pub unit_coefficient: Decimal,
    pub receive_status: ReceiveStatus,
    pub create_time: PrimitiveDateTime,
    pub statistical_status: StatisticalStatus,
    pub min_unit_price: Decimal,
    pub tag: Option<String>,
    pub evaluate: Option<String>,
    pub start_use_time: Option<Date>,
    pub end_use_time: Option<Date>,
    pub daily_average_price: Decimal,
    pub pickup_code: Option<String>,
}

/// The JSON body for creating or updating a consumption record.
///
/// Every field is optional so that the same shape serves both a create,
/// where the required fields are checked, and a partial update, where
/// omitted fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionData {
    pub content: Option<String>,
    pub quantity: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub channel: Option<String>,
    pub main_type: Option<String>,
    pub sub_type: Option<String>,
    pub unit_coefficient: Option<Decimal>,
    pub receive_status: Option<ReceiveStatus>,
    /// When the item was bought, e.g. "2026-02-18T12:15" or "2026-02-18 12:15:00".
    pub purchase_time: Option<String>,
    pub tag: Option<String>,
    pub evaluate: Option<String>,
    /// A date formatted as "YYYY-MM-DD".
    pub start_use_time: Option<String>,
    /// A date formatted as "YYYY-MM-DD".
    pub end_use_time: Option<String>,
    #[serde(alias = "pickupCode")]
    pub pickup_code: Option<String>,
}


#[cfg(test)]
mod consumption_data_tests {
    use rust_decimal_macros::dec;

    use super::ConsumptionData;

    #[test]
    fn accepts_camel_case_pickup_code() {
        let data: ConsumptionData =
            serde_json::from_str(r#"{"pickupCode": "12-3-4567", "quantity": 2}"#).unwrap();

        assert_eq!(data.pickup_code.as_deref(), Some("12-3-4567"));
        assert_eq!(data.quantity, Some(dec!(2)));
        assert_eq!(data.content, None);
    }
}
