//! Implements a SQLite backed category store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Category, CategoryName, DatabaseID},
    stores::{CategoryDeleteMode, CategoryStore},
};

/// Stores categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCategoryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SqliteCategoryStore {
    /// Create a new category in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateCategoryName] if a category named `name` exists,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, name: CategoryName, group: Option<String>) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO category (name, grouping) VALUES (?1, ?2)
                 RETURNING id, name, grouping",
            )?
            .query_row((name.as_ref(), &group), Self::map_row)
            .map_err(|error| match error {
                // Code 2067 occurs when a UNIQUE constraint failed.
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 2067 =>
                {
                    Error::DuplicateCategoryName(name.to_string())
                }
                error => error.into(),
            })?;

        Ok(category)
    }

    /// Retrieve a category in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, grouping FROM category WHERE id = :id")?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(category)
    }

    /// Retrieve a category in the database by its unique `name`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no category is named `name`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_name(&self, name: &CategoryName) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, grouping FROM category WHERE name = :name")?
            .query_row(&[(":name", &name.as_ref())], Self::map_row)?;

        Ok(category)
    }

    /// Retrieve all categories, ordered by name.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_all(&self) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, grouping FROM category ORDER BY name")?
            .query_map([], Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    /// Delete a category, either blocking on or cascading to the records
    /// that reference it.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::CategoryInUse] if the category is referenced and `mode` is
    ///   [CategoryDeleteMode::Block],
    /// - [Error::NotFound] if `id` does not refer to a valid category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID, mode: CategoryDeleteMode) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();

        let rows_deleted = match mode {
            CategoryDeleteMode::Block => connection
                .execute("DELETE FROM category WHERE id = ?1", (id,))
                .map_err(|error| match error {
                    // Code 787 occurs when a FOREIGN KEY constraint failed:
                    // some record still references the category.
                    rusqlite::Error::SqliteFailure(sql_error, Some(_))
                        if sql_error.extended_code == 787 =>
                    {
                        Error::CategoryInUse
                    }
                    error => error.into(),
                })?,
            CategoryDeleteMode::Cascade => {
                let tx = connection.unchecked_transaction()?;

                tx.execute("DELETE FROM \"transaction\" WHERE category_id = ?1", (id,))?;
                tx.execute("DELETE FROM budget WHERE category_id = ?1", (id,))?;
                tx.execute("DELETE FROM recurring WHERE category_id = ?1", (id,))?;
                let rows_deleted = tx.execute("DELETE FROM category WHERE id = ?1", (id,))?;

                tx.commit()?;
                rows_deleted
            }
        };

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SqliteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    grouping TEXT
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let name: String = row.get(offset + 1)?;
        let group = row.get(offset + 2)?;

        Ok(Category::new(
            id,
            CategoryName::new_unchecked(&name),
            group,
        ))
    }
}

#[cfg(test)]
mod sqlite_category_store_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        models::{CategoryName, Transaction},
        stores::{
            CategoryDeleteMode, CategoryStore, TransactionStore,
            sqlite::{SqlAppState, create_app_state},
        },
    };

    fn get_app_state() -> SqlAppState {
        let connection = Connection::open_in_memory().unwrap();
        create_app_state(connection).unwrap()
    }

    #[test]
    fn create_succeeds() {
        let mut state = get_app_state();

        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Pets"), None)
            .unwrap();

        assert_eq!(category.name().as_ref(), "Pets");
        assert_eq!(category.group(), None);
    }

    #[test]
    fn create_fails_on_duplicate_name() {
        let mut state = get_app_state();
        state
            .category_store
            .create(CategoryName::new_unchecked("Pets"), None)
            .unwrap();

        let duplicate = state
            .category_store
            .create(CategoryName::new_unchecked("Pets"), None);

        assert_eq!(
            duplicate,
            Err(Error::DuplicateCategoryName("Pets".to_string()))
        );
    }

    #[test]
    fn get_by_id_and_name_agree() {
        let mut state = get_app_state();
        let want = state
            .category_store
            .create(
                CategoryName::new_unchecked("Pets"),
                Some("Essentials".to_string()),
            )
            .unwrap();

        let by_id = state.category_store.get(want.id()).unwrap();
        let by_name = state
            .category_store
            .get_by_name(&CategoryName::new_unchecked("Pets"))
            .unwrap();

        assert_eq!(by_id, want);
        assert_eq!(by_name, want);
    }

    #[test]
    fn get_fails_on_invalid_id() {
        let state = get_app_state();

        let got = state.category_store.get(99_999);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn get_all_is_sorted_by_name() {
        let state = get_app_state();

        let names: Vec<String> = state
            .category_store
            .get_all()
            .unwrap()
            .iter()
            .map(|category| category.name().to_string())
            .collect();

        let mut want = names.clone();
        want.sort();
        assert_eq!(names, want, "want categories sorted by name");
    }

    #[test]
    fn delete_unreferenced_category_succeeds() {
        let mut state = get_app_state();
        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Pets"), None)
            .unwrap();

        state
            .category_store
            .delete(category.id(), CategoryDeleteMode::Block)
            .unwrap();

        assert_eq!(state.category_store.get(category.id()), Err(Error::NotFound));
    }

    #[test]
    fn delete_referenced_category_fails_without_cascade() {
        let mut state = get_app_state();
        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Pets"), None)
            .unwrap();
        state
            .transaction_store
            .create(Transaction::build(-5_000, category.id()))
            .unwrap();

        let result = state
            .category_store
            .delete(category.id(), CategoryDeleteMode::Block);

        assert_eq!(result, Err(Error::CategoryInUse));
    }

    #[test]
    fn delete_referenced_category_cascades_when_requested() {
        let mut state = get_app_state();
        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Pets"), None)
            .unwrap();
        let transaction = state
            .transaction_store
            .create(Transaction::build(-5_000, category.id()))
            .unwrap();

        state
            .category_store
            .delete(category.id(), CategoryDeleteMode::Cascade)
            .unwrap();

        assert_eq!(state.category_store.get(category.id()), Err(Error::NotFound));
        assert_eq!(
            state.transaction_store.get(transaction.id()),
            Err(Error::NotFound),
            "cascade delete should remove referencing transactions"
        );
    }

    #[test]
    fn delete_fails_on_invalid_id() {
        let mut state = get_app_state();

        let result = state.category_store.delete(99_999, CategoryDeleteMode::Block);

        assert_eq!(result, Err(Error::NotFound));
    }
}
