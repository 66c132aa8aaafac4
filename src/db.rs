//! Database set up for the application.

use rusqlite::Connection;

use crate::{
    Error,
    consumption::create_consumption_table,
    lookup::{Channel, MainType, SubType, create_lookup_table},
};

/// Create all of the database tables for the application.
///
/// Existing tables are left untouched, so this is safe to call on every start-up.
///
/// # Errors
/// This function may return a [rusqlite::Error] if something went wrong creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_consumption_table(&transaction)?;
    create_lookup_table::<Channel>(&transaction)?;
    create_lookup_table::<MainType>(&transaction)?;
    create_lookup_table::<SubType>(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;

    use super::initialize;

    fn table_names(connection: &Connection) -> Vec<String> {
        connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let tables = table_names(&connection);
        for table in ["channel", "consumption", "main_type", "sub_type"] {
            assert!(
                tables.iter().any(|name| name == table),
                "missing table {table}, got {tables:?}"
            );
        }
    }

    #[test]
    fn initialize_twice_succeeds() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        let got = initialize(&connection);

        assert_eq!(got, Ok(()));
    }
}
