//! Defines the crate level error type.

use std::sync::Arc;

use crate::models::DatabaseID;

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The category name already exists in the database.
    ///
    /// Category names are unique so that CSV imports can resolve categories
    /// by name without ambiguity.
    #[error("the category \"{0}\" already exists in the database")]
    DuplicateCategoryName(String),

    /// A date string could not be parsed as an ISO-8601 calendar date.
    #[error("could not parse \"{0}\" as a date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// A month string could not be parsed as a year-month period.
    #[error("could not parse \"{0}\" as a month (expected YYYY-MM)")]
    InvalidMonth(String),

    /// An amount string could not be parsed as a currency amount.
    ///
    /// Amounts are plain decimal strings with at most two fraction digits.
    #[error("could not parse \"{0}\" as an amount")]
    InvalidAmount(String),

    /// The category ID used to create or update a record did not match a
    /// valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<DatabaseID>),

    /// Tried to delete a category that is still referenced by a transaction,
    /// budget, or recurring template without requesting a cascade.
    #[error("the category is referenced by existing records")]
    CategoryInUse,

    /// The requested record could not be found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested record could not be found")]
    NotFound,

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV data: {0}")]
    InvalidCsv(String),

    /// An error occurred reading or writing a file.
    ///
    /// The inner string is the display form of the underlying IO error so
    /// that `Error` stays comparable in tests.
    #[error("IO error: {0}")]
    Io(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(Arc<rusqlite::Error>),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidCategory(None)
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.name") =>
            {
                Error::DuplicateCategoryName(String::new())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(Arc::new(error))
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}
