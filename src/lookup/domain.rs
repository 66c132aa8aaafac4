//! Core lookup table domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, consumption::get_used_sub_types, endpoints, lookup::get_entries};

/// A validated, non-empty name for a channel, main type or sub type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct LookupName(String);

impl LookupName {
    /// Create a lookup name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a lookup name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for LookupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for LookupName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookupName::new(s)
    }
}

impl Display for LookupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a lookup entry.
pub type LookupId = i64;

/// A stored channel, main type or sub type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct LookupEntry {
    pub id: LookupId,
    pub name: LookupName,
}

/// An entry in a lookup listing.
///
/// `id` is `None` for names that are in use by consumption records but have no stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupListing {
    pub id: Option<LookupId>,
    pub name: String,
}

impl From<LookupEntry> for LookupListing {
    fn from(entry: LookupEntry) -> Self {
        Self {
            id: Some(entry.id),
            name: entry.name.to_string(),
        }
    }
}

/// The JSON body for creating or renaming a lookup entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupFormData {
    pub name: String,
}

/// A table of names that consumption records are classified by.
///
/// Each kind gets its own table and its own set of endpoints.
pub trait LookupKind: Sized + Send + Sync + 'static {
    /// The name of the database table.
    const TABLE: &'static str;
    /// What the entries are called in messages, e.g. "channel".
    const LABEL: &'static str;
    /// The route for listing and creating entries.
    const COLLECTION_PATH: &'static str;
    /// The route for updating and deleting one entry.
    const ITEM_PATH: &'static str;

    /// The entries shown to clients, ordered by ID.
    fn list(connection: &Connection) -> Result<Vec<LookupListing>, Error> {
        Ok(get_entries::<Self>(connection)?
            .into_iter()
            .map(LookupListing::from)
            .collect())
    }
}

/// Where an item was bought, e.g. a shop or website.
#[derive(Debug, Clone, Copy)]
pub struct Channel;

impl LookupKind for Channel {
    const TABLE: &'static str = "channel";
    const LABEL: &'static str = "channel";
    const COLLECTION_PATH: &'static str = endpoints::CHANNELS;
    const ITEM_PATH: &'static str = endpoints::CHANNEL;
}

/// The bill category, e.g. "Food".
#[derive(Debug, Clone, Copy)]
pub struct MainType;

impl LookupKind for MainType {
    const TABLE: &'static str = "main_type";
    const LABEL: &'static str = "main type";
    const COLLECTION_PATH: &'static str = endpoints::MAIN_TYPES;
    const ITEM_PATH: &'static str = endpoints::MAIN_TYPE;
}

/// The sub-category within a bill category, e.g. "Snacks".
#[derive(Debug, Clone, Copy)]
pub struct SubType;

impl LookupKind for SubType {
    const TABLE: &'static str = "sub_type";
    const LABEL: &'static str = "sub type";
    const COLLECTION_PATH: &'static str = endpoints::SUB_TYPES;
    const ITEM_PATH: &'static str = endpoints::SUB_TYPE;

    /// The stored sub types followed by any other sub types used by live records.
    fn list(connection: &Connection) -> Result<Vec<LookupListing>, Error> {
        let mut listing: Vec<LookupListing> = get_entries::<Self>(connection)?
            .into_iter()
            .map(LookupListing::from)
            .collect();

        for name in get_used_sub_types(connection)? {
            if !listing.iter().any(|entry| entry.name == name) {
                listing.push(LookupListing { id: None, name });
            }
        }

        Ok(listing)
    }
}
