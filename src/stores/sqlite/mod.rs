//! SQLite backed implementations of the store traits, plus the convenience
//! function that assembles an [AppState] over them.

mod budget;
mod category;
mod recurring;
mod transaction;

pub use budget::SqliteBudgetStore;
pub use category::SqliteCategoryStore;
pub use recurring::SqliteRecurringStore;
pub use transaction::SqliteTransactionStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, state::AppState};

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SqlAppState = AppState<
    SqliteCategoryStore,
    SqliteTransactionStore,
    SqliteBudgetStore,
    SqliteRecurringStore,
>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the
/// domain models and seeding the default categories if the database is new.
pub fn create_app_state(db_connection: Connection) -> Result<SqlAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        connection.clone(),
        SqliteCategoryStore::new(connection.clone()),
        SqliteTransactionStore::new(connection.clone()),
        SqliteBudgetStore::new(connection.clone()),
        SqliteRecurringStore::new(connection),
    ))
}
