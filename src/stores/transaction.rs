//! Defines the transaction store trait and its query type.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    models::{Cents, DatabaseID, Transaction, TransactionBuilder},
};

/// Handles the creation and retrieval of transactions.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if the builder's category does not
    /// exist.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// Overwrite the stored transaction with the same id as `transaction`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no such transaction exists, or
    /// [Error::InvalidCategory] if the new category does not exist.
    fn update(&mut self, transaction: &Transaction) -> Result<(), Error>;

    /// Delete a transaction from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a transaction.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;

    /// Get the total number of transactions in the store.
    fn count(&self) -> Result<usize, Error>;
}

/// Whether a transaction is money in or money out.
///
/// Amounts of zero count as income so the two kinds partition the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// A non-negative amount.
    Income,
    /// A negative amount.
    Expense,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_query].
///
/// The default query selects everything in storage order.
#[derive(Debug, Default, Clone)]
pub struct TransactionQuery {
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only transactions in the given category.
    pub category_id: Option<DatabaseID>,
    /// Include only income or only expenses.
    pub kind: Option<TransactionKind>,
    /// Include only transactions whose absolute amount is at least this.
    pub min_amount: Option<Cents>,
    /// Include only transactions whose absolute amount is at most this.
    pub max_amount: Option<Cents>,
    /// Include only transactions whose note contains this text.
    pub note_contains: Option<String>,
    /// Orders transactions by date. `None` returns transactions in the
    /// order they are stored.
    pub sort_date: Option<SortOrder>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Skips the first N (`offset`) transactions.
    pub offset: u64,
}

impl TransactionQuery {
    /// A query for every transaction dated within `date_range`.
    pub fn for_dates(date_range: RangeInclusive<Date>) -> Self {
        Self {
            date_range: Some(date_range),
            ..Default::default()
        }
    }
}
