//! Database operations for the lookup tables.
//!
//! Every lookup kind shares the same schema, so the functions are generic over
//! [LookupKind] and only the table name changes.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    lookup::{LookupEntry, LookupId, LookupKind, LookupName},
};

/// Create an entry and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateName] if an entry with the same name already exists.
pub fn create_entry<K: LookupKind>(
    name: LookupName,
    connection: &Connection,
) -> Result<LookupEntry, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO {} (name) VALUES (?1) RETURNING id, name",
            K::TABLE
        ))?
        .query_row((name.as_ref(),), map_row)
        .map_err(|error| duplicate_name_error(error, &name))
}

/// Retrieve a single entry by ID.
pub fn get_entry<K: LookupKind>(
    id: LookupId,
    connection: &Connection,
) -> Result<LookupEntry, Error> {
    connection
        .prepare(&format!("SELECT id, name FROM {} WHERE id = :id", K::TABLE))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all entries ordered by ID.
pub fn get_entries<K: LookupKind>(connection: &Connection) -> Result<Vec<LookupEntry>, Error> {
    connection
        .prepare(&format!("SELECT id, name FROM {} ORDER BY id ASC", K::TABLE))?
        .query_map([], map_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Rename an entry.
///
/// # Errors
/// Returns [Error::NotFound] if the entry doesn't exist, or
/// [Error::DuplicateName] if another entry already has `new_name`.
pub fn update_entry<K: LookupKind>(
    id: LookupId,
    new_name: LookupName,
    connection: &Connection,
) -> Result<LookupEntry, Error> {
    let rows_affected = connection
        .execute(
            &format!("UPDATE {} SET name = ?1 WHERE id = ?2", K::TABLE),
            (new_name.as_ref(), id),
        )
        .map_err(|error| duplicate_name_error(error, &new_name))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(LookupEntry { id, name: new_name })
}

/// Delete an entry by ID.
///
/// Consumption records that use the name keep it, since they store the name
/// rather than a reference to the entry.
///
/// # Errors
/// Returns [Error::NotFound] if the entry doesn't exist.
pub fn delete_entry<K: LookupKind>(id: LookupId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute(&format!("DELETE FROM {} WHERE id = ?1", K::TABLE), [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the table for one lookup kind.
pub fn create_lookup_table<K: LookupKind>(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );",
        K::TABLE
    ))?;

    Ok(())
}

fn duplicate_name_error(error: rusqlite::Error, name: &LookupName) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
            Error::DuplicateName(name.to_string())
        }
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<LookupEntry, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = LookupName::new_unchecked(&raw_name);

    Ok(LookupEntry { id, name })
}
