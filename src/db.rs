//! Defines traits for mapping the domain models to SQLite tables and the
//! function that bootstraps the application database.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    stores::sqlite::{
        SqliteBudgetStore, SqliteCategoryStore, SqliteRecurringStore, SqliteTransactionStore,
    },
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the
    /// table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading from the column at `offset`.
    ///
    /// This is useful in cases where tables have been joined and you want to
    /// construct two different types from the one query.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Categories seeded into a fresh database.
const DEFAULT_CATEGORIES: [&str; 9] = [
    "Food",
    "Transport",
    "Rent",
    "Utilities",
    "Shopping",
    "Health",
    "Entertainment",
    "Salary",
    "Other",
];

/// Create the tables for the domain models and seed the default categories.
///
/// Foreign key enforcement is switched on for `connection`, so the same
/// connection should be used for subsequent store operations.
///
/// This function is a no-op on a database that has already been initialized,
/// except that it always re-enables foreign key enforcement (the pragma is
/// per-connection in SQLite).
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    SqliteCategoryStore::create_table(connection)?;
    SqliteTransactionStore::create_table(connection)?;
    SqliteBudgetStore::create_table(connection)?;
    SqliteRecurringStore::create_table(connection)?;

    let category_count: i64 =
        connection.query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))?;

    if category_count == 0 {
        let mut statement =
            connection.prepare("INSERT OR IGNORE INTO category (name, grouping) VALUES (?1, NULL)")?;

        for name in DEFAULT_CATEGORIES {
            statement.execute((name,))?;
        }

        tracing::info!("seeded {} default categories", DEFAULT_CATEGORIES.len());
    }

    Ok(())
}
