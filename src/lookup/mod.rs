//! Lookup tables for the purchase channels, main types and sub types that
//! consumption records are classified by.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_entry, create_lookup_table, delete_entry, get_entries, get_entry, update_entry,
};
pub use domain::{
    Channel, LookupEntry, LookupId, LookupKind, LookupListing, LookupName, MainType, SubType,
};
pub use endpoints::{
    LookupState, create_entry_endpoint, delete_entry_endpoint, list_entries_endpoint,
    update_entry_endpoint,
};
