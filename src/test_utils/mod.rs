#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::{assert_status_ok, get_test_connection, parse_json_body};
