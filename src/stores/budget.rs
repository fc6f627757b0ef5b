//! Defines the budget store trait.

use crate::{
    Error,
    models::{Budget, Cents, DatabaseID, Month},
};

/// Stores monthly spending targets per category.
pub trait BudgetStore {
    /// Set the budget for `(category_id, month)`, creating the row or
    /// overwriting the amount of an existing one.
    ///
    /// The create-or-update semantics structurally enforce the invariant
    /// that at most one budget exists per `(category, month)` pair.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if `category_id` does not refer to
    /// a valid category.
    fn upsert(&mut self, category_id: DatabaseID, month: Month, amount: Cents)
    -> Result<Budget, Error>;

    /// Get all budgets for `month`, ordered by category id.
    fn get_for_month(&self, month: Month) -> Result<Vec<Budget>, Error>;

    /// Get all budgets, ordered by month then category id.
    fn get_all(&self) -> Result<Vec<Budget>, Error>;

    /// Delete a budget row.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a budget.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;
}
