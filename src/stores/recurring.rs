//! Defines the recurring template store trait.

use time::Date;

use crate::{
    Error,
    models::{Cents, DatabaseID, Recurrence, RecurringTemplate},
};

/// Stores the templates that auto-generate transactions on a schedule.
pub trait RecurringStore {
    /// Create a new recurring template.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if `category_id` does not refer to
    /// a valid category.
    fn create(
        &mut self,
        category_id: DatabaseID,
        amount: Cents,
        note: &str,
        recurrence: Recurrence,
        next_due: Date,
    ) -> Result<RecurringTemplate, Error>;

    /// Get all templates, ordered by next due date.
    fn get_all(&self) -> Result<Vec<RecurringTemplate>, Error>;

    /// Overwrite the stored template with the same id as `template`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such template exists.
    fn update(&mut self, template: &RecurringTemplate) -> Result<(), Error>;

    /// Persist a new next due date for the template.
    ///
    /// The posting pass calls this after inserting the transactions a
    /// template was due for; `next_due` only ever moves forward.
    fn set_next_due(&mut self, id: DatabaseID, next_due: Date) -> Result<(), Error>;

    /// Delete a template.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a template.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;
}
