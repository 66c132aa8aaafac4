//! Consumption records: one purchased item each, with the fields derived from
//! its price, quantity, use dates and receive status.

mod calculator;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod merge;

pub(crate) use calculator::USE_DATE_FORMAT;
pub use calculator::{
    compute_daily_average_price, compute_min_unit_price, compute_statistical_status,
};
pub use create::create_consumption_endpoint;
pub use db::{
    ConsumptionQuery, create_consumption, create_consumption_table, get_consumption,
    get_used_sub_types, query_consumptions, soft_delete_consumption, update_consumption,
};
pub(crate) use db::{create_time_to_sql, get_parsed};
pub use delete::delete_consumption_endpoint;
pub use domain::{
    ConsumptionData, ConsumptionId, ConsumptionRecord, NewConsumption, ReceiveStatus,
    StatisticalStatus,
};
pub use edit::update_consumption_endpoint;
pub use list::{
    get_consumption_endpoint, list_consumptions_by_sub_type_endpoint,
    list_consumptions_by_tag_endpoint, list_consumptions_endpoint,
    list_pending_consumptions_endpoint,
};
pub use merge::{apply_update, parse_purchase_time, prepare_new_consumption};

#[cfg(test)]
pub(crate) use db::test_utils;
