//! Implements a SQLite backed store for recurring templates.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, types::Type};
use time::Date;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Cents, DatabaseID, Recurrence, RecurringTemplate},
    stores::RecurringStore,
};

/// Stores recurring transaction templates in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteRecurringStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecurringStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RecurringStore for SqliteRecurringStore {
    /// Create a new recurring template in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCategory] if `category_id` does not refer to a valid
    ///   category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(
        &mut self,
        category_id: DatabaseID,
        amount: Cents,
        note: &str,
        recurrence: Recurrence,
        next_due: Date,
    ) -> Result<RecurringTemplate, Error> {
        let template = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO recurring (category_id, amount, note, recurrence, next_due)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, category_id, amount, note, recurrence, next_due",
            )?
            .query_row(
                (category_id, amount, note, recurrence.as_str(), next_due),
                Self::map_row,
            )
            .map_err(|error| match error {
                // Code 787 occurs when a FOREIGN KEY constraint failed.
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 787 =>
                {
                    Error::InvalidCategory(Some(category_id))
                }
                error => error.into(),
            })?;

        Ok(template)
    }

    /// Retrieve all templates, ordered by next due date.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_all(&self) -> Result<Vec<RecurringTemplate>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, category_id, amount, note, recurrence, next_due FROM recurring
                 ORDER BY next_due, id",
            )?
            .query_map([], Self::map_row)?
            .map(|maybe_template| maybe_template.map_err(|error| error.into()))
            .collect()
    }

    /// Overwrite the stored template with the same id as `template`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no template has the id,
    /// - [Error::InvalidCategory] if the new category does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, template: &RecurringTemplate) -> Result<(), Error> {
        let rows_updated = self
            .connection
            .lock()
            .unwrap()
            .execute(
                "UPDATE recurring
                 SET category_id = ?1, amount = ?2, note = ?3, recurrence = ?4, next_due = ?5
                 WHERE id = ?6",
                (
                    template.category_id(),
                    template.amount(),
                    template.note(),
                    template.recurrence().as_str(),
                    template.next_due(),
                    template.id(),
                ),
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 787 =>
                {
                    Error::InvalidCategory(Some(template.category_id()))
                }
                error => error.into(),
            })?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Persist a new next due date for the template.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid template,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn set_next_due(&mut self, id: DatabaseID, next_due: Date) -> Result<(), Error> {
        let rows_updated = self
            .connection
            .lock()
            .unwrap()
            .execute(
                "UPDATE recurring SET next_due = ?1 WHERE id = ?2",
                (next_due, id),
            )?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete a template from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid template,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM recurring WHERE id = ?1", (id,))?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SqliteRecurringStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS recurring (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    category_id INTEGER NOT NULL,
                    amount INTEGER NOT NULL,
                    note TEXT NOT NULL DEFAULT '',
                    recurrence TEXT NOT NULL,
                    next_due TEXT NOT NULL,
                    FOREIGN KEY(category_id) REFERENCES category(id)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteRecurringStore {
    type ReturnType = RecurringTemplate;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let category_id = row.get(offset + 1)?;
        let amount = row.get(offset + 2)?;
        let note = row.get(offset + 3)?;
        let recurrence: String = row.get(offset + 4)?;
        let recurrence = Recurrence::parse(&recurrence).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 4,
                Type::Text,
                Box::new(std::io::Error::other(error.to_string())),
            )
        })?;
        let next_due = row.get(offset + 5)?;

        Ok(RecurringTemplate::new(
            id,
            category_id,
            amount,
            note,
            recurrence,
            next_due,
        ))
    }
}
