//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/consumption/{consumption_id}', use [format_endpoint].

use std::fmt::Display;

/// The route to list and create consumption records.
pub const CONSUMPTIONS: &str = "/api/consumption";
/// The route to get, update and delete a single consumption record.
pub const CONSUMPTION: &str = "/api/consumption/{consumption_id}";
/// The route to list the records that have not arrived yet.
pub const PENDING_CONSUMPTIONS: &str = "/api/consumption/pending";
/// The route to list the received records of one sub type.
pub const CONSUMPTIONS_BY_SUB_TYPE: &str = "/api/consumption/type/{sub_type}";
/// The route to list the records with one tag.
pub const CONSUMPTIONS_BY_TAG: &str = "/api/consumption/tag/{tag}";
/// The route for the spending totals per main type.
pub const STATISTICS: &str = "/api/consumption/statistics";
/// The route to list and create channels.
pub const CHANNELS: &str = "/api/channel";
/// The route to update and delete a channel.
pub const CHANNEL: &str = "/api/channel/{channel_id}";
/// The route to list and create main types.
pub const MAIN_TYPES: &str = "/api/main-type";
/// The route to update and delete a main type.
pub const MAIN_TYPE: &str = "/api/main-type/{main_type_id}";
/// The route to list and create sub types.
pub const SUB_TYPES: &str = "/api/sub-type";
/// The route to update and delete a sub type.
pub const SUB_TYPE: &str = "/api/sub-type/{sub_type_id}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter starts with a left brace and ends with a right brace.
/// For example, in the endpoint path '/api/channel/{channel_id}', '{channel_id}' is the parameter.
///
/// This function assumes that an endpoint path contains at most one parameter.
/// `value` is inserted as is, so text values should already be URL safe.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
