//! Defines the category store trait.

use crate::{
    Error,
    models::{Category, CategoryName, DatabaseID},
};

/// What to do when deleting a category that other records reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryDeleteMode {
    /// Refuse the delete with [Error::CategoryInUse] if any transaction,
    /// budget or recurring template references the category.
    #[default]
    Block,
    /// Delete the referencing transactions, budgets and recurring templates
    /// together with the category, atomically.
    Cascade,
}

/// Creates and retrieves categories for transactions, budgets and recurring
/// templates.
pub trait CategoryStore {
    /// Create a new category and add it to the store.
    ///
    /// # Errors
    /// Returns [Error::DuplicateCategoryName] if `name` is already taken.
    fn create(&mut self, name: CategoryName, group: Option<String>) -> Result<Category, Error>;

    /// Get a category by its ID.
    fn get(&self, id: DatabaseID) -> Result<Category, Error>;

    /// Get a category by its unique name.
    fn get_by_name(&self, name: &CategoryName) -> Result<Category, Error>;

    /// Get all categories, ordered by name.
    fn get_all(&self) -> Result<Vec<Category>, Error>;

    /// Delete a category.
    ///
    /// # Errors
    /// Returns [Error::CategoryInUse] if the category is referenced and
    /// `mode` is [CategoryDeleteMode::Block], or [Error::NotFound] if `id`
    /// does not refer to a category.
    fn delete(&mut self, id: DatabaseID, mode: CategoryDeleteMode) -> Result<(), Error>;
}
