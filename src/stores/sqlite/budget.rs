//! Implements a SQLite backed budget store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Budget, Cents, DatabaseID, Month},
    stores::BudgetStore,
};

/// Stores monthly budgets in a SQLite database.
///
/// The `(category_id, month)` pair is UNIQUE, so a budget can never be
/// duplicated for a period; [BudgetStore::upsert] overwrites the amount
/// instead.
#[derive(Debug, Clone)]
pub struct SqliteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteBudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl BudgetStore for SqliteBudgetStore {
    /// Set the budget for `(category_id, month)`, inserting the row or
    /// overwriting the amount of an existing one.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCategory] if `category_id` does not refer to a valid
    ///   category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn upsert(
        &mut self,
        category_id: DatabaseID,
        month: Month,
        amount: Cents,
    ) -> Result<Budget, Error> {
        let budget = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO budget (category_id, month, amount) VALUES (?1, ?2, ?3)
                 ON CONFLICT(category_id, month) DO UPDATE SET amount = excluded.amount
                 RETURNING id, category_id, month, amount",
            )?
            .query_row((category_id, month, amount), Self::map_row)
            .map_err(|error| match error {
                // Code 787 occurs when a FOREIGN KEY constraint failed.
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 787 =>
                {
                    Error::InvalidCategory(Some(category_id))
                }
                error => error.into(),
            })?;

        Ok(budget)
    }

    /// Retrieve the budgets for `month`, ordered by category id.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_for_month(&self, month: Month) -> Result<Vec<Budget>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, category_id, month, amount FROM budget
                 WHERE month = :month
                 ORDER BY category_id",
            )?
            .query_map(&[(":month", &month)], Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
            .collect()
    }

    /// Retrieve all budgets, ordered by month then category id.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_all(&self) -> Result<Vec<Budget>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, category_id, month, amount FROM budget
                 ORDER BY month, category_id",
            )?
            .query_map([], Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
            .collect()
    }

    /// Delete a budget row.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid budget,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM budget WHERE id = ?1", (id,))?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SqliteBudgetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    category_id INTEGER NOT NULL,
                    month TEXT NOT NULL,
                    amount INTEGER NOT NULL,
                    UNIQUE(category_id, month),
                    FOREIGN KEY(category_id) REFERENCES category(id)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteBudgetStore {
    type ReturnType = Budget;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let category_id = row.get(offset + 1)?;
        let month = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;

        Ok(Budget::new(id, category_id, month, amount))
    }
}

#[cfg(test)]
mod sqlite_budget_store_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        models::{CategoryName, DatabaseID, Month},
        stores::{
            BudgetStore, CategoryStore,
            sqlite::{SqlAppState, create_app_state},
        },
    };

    fn get_app_state_and_category() -> (SqlAppState, DatabaseID) {
        let connection = Connection::open_in_memory().unwrap();
        let mut state = create_app_state(connection).unwrap();
        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Groceries"), None)
            .unwrap();
        let category_id = category.id();

        (state, category_id)
    }

    #[test]
    fn upsert_creates_budget() {
        let (mut state, category_id) = get_app_state_and_category();
        let month = Month::new(2024, 1).unwrap();

        let budget = state.budget_store.upsert(category_id, month, 30_000).unwrap();

        assert_eq!(budget.category_id(), category_id);
        assert_eq!(budget.month(), month);
        assert_eq!(budget.amount(), 30_000);
    }

    #[test]
    fn upsert_twice_keeps_one_row_with_latest_amount() {
        let (mut state, category_id) = get_app_state_and_category();
        let month = Month::new(2024, 1).unwrap();

        let first = state.budget_store.upsert(category_id, month, 30_000).unwrap();
        let second = state.budget_store.upsert(category_id, month, 45_000).unwrap();

        assert_eq!(
            first.id(),
            second.id(),
            "upsert must overwrite, not create a second row"
        );

        let budgets = state.budget_store.get_for_month(month).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount(), 45_000);
    }

    #[test]
    fn upsert_fails_on_invalid_category() {
        let (mut state, _) = get_app_state_and_category();
        let month = Month::new(2024, 1).unwrap();

        let result = state.budget_store.upsert(99_999, month, 30_000);

        assert_eq!(result, Err(Error::InvalidCategory(Some(99_999))));
    }

    #[test]
    fn get_for_month_excludes_other_months() {
        let (mut state, category_id) = get_app_state_and_category();
        let january = Month::new(2024, 1).unwrap();
        let february = Month::new(2024, 2).unwrap();
        let want = vec![state.budget_store.upsert(category_id, january, 30_000).unwrap()];
        state
            .budget_store
            .upsert(category_id, february, 40_000)
            .unwrap();

        let got = state.budget_store.get_for_month(january).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn delete_removes_budget() {
        let (mut state, category_id) = get_app_state_and_category();
        let month = Month::new(2024, 1).unwrap();
        let budget = state.budget_store.upsert(category_id, month, 30_000).unwrap();

        state.budget_store.delete(budget.id()).unwrap();

        assert_eq!(state.budget_store.get_for_month(month), Ok(vec![]));
    }

    #[test]
    fn delete_fails_on_invalid_id() {
        let (mut state, _) = get_app_state_and_category();

        let result = state.budget_store.delete(99_999);

        assert_eq!(result, Err(Error::NotFound));
    }
}
