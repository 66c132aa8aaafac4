//! Endpoints for listing, creating, renaming and deleting lookup entries.

use std::{
    marker::PhantomData,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    ApiResponse, AppState, Error,
    api_response::list_response,
    endpoints::format_endpoint,
    lookup::{
        LookupId, LookupKind, LookupName, create_entry, delete_entry, domain::LookupFormData,
        update_entry,
    },
};

/// The state needed for managing the entries of one lookup kind.
#[derive(Debug)]
pub struct LookupState<K> {
    pub db_connection: Arc<Mutex<Connection>>,
    kind: PhantomData<K>,
}

impl<K> Clone for LookupState<K> {
    fn clone(&self) -> Self {
        Self {
            db_connection: self.db_connection.clone(),
            kind: PhantomData,
        }
    }
}

impl<K> LookupState<K> {
    fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            db_connection,
            kind: PhantomData,
        }
    }
}

impl<K> FromRef<AppState> for LookupState<K> {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db_connection.clone())
    }
}

/// List every entry of the kind `K`.
pub async fn list_entries_endpoint<K: LookupKind>(
    State(state): State<LookupState<K>>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let listing = K::list(&connection)?;

    Ok(list_response(listing))
}

/// Handle a request to create an entry of the kind `K`.
pub async fn create_entry_endpoint<K: LookupKind>(
    State(state): State<LookupState<K>>,
    Json(form_data): Json<LookupFormData>,
) -> Result<Response, Error> {
    let name = LookupName::new(&form_data.name)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entry = create_entry::<K>(name, &connection)?;
    tracing::info!("Created {} \"{}\"", K::LABEL, entry.name);
    let location = format_endpoint(K::ITEM_PATH, entry.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(ApiResponse::data(entry).with_message(&format!("Created {}", K::LABEL))),
    )
        .into_response())
}

/// Handle a request to rename an entry of the kind `K`.
pub async fn update_entry_endpoint<K: LookupKind>(
    Path(entry_id): Path<LookupId>,
    State(state): State<LookupState<K>>,
    Json(form_data): Json<LookupFormData>,
) -> Result<Response, Error> {
    let name = LookupName::new(&form_data.name)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entry = update_entry::<K>(entry_id, name, &connection)?;

    Ok(Json(ApiResponse::data(entry).with_message(&format!("Updated {}", K::LABEL))).into_response())
}

/// Handle a request to delete an entry of the kind `K`.
pub async fn delete_entry_endpoint<K: LookupKind>(
    Path(entry_id): Path<LookupId>,
    State(state): State<LookupState<K>>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_entry::<K>(entry_id, &connection)?;
    tracing::info!("Deleted {} {entry_id}", K::LABEL);

    Ok(Json(ApiResponse::message(&format!("Deleted {}", K::LABEL))).into_response())
}
