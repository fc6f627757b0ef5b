//! This file defines the `Transaction` type, the core record of the
//! application.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::models::{Cents, DatabaseID};

/// A single dated, signed monetary record.
///
/// Positive amounts are income, negative amounts are expenses.
///
/// To create a new `Transaction`, use [Transaction::build] and pass the
/// builder to the transaction store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: DatabaseID,
    date: Date,
    amount: Cents,
    category_id: DatabaseID,
    note: String,
}

impl Transaction {
    /// Create a builder for a new transaction.
    pub fn build(amount: Cents, category_id: DatabaseID) -> TransactionBuilder {
        TransactionBuilder::new(amount, category_id)
    }

    /// Reconstruct a transaction from its stored parts.
    ///
    /// This is intended for the storage layer, which reads validated rows.
    pub fn new_unchecked(
        id: DatabaseID,
        date: Date,
        amount: Cents,
        category_id: DatabaseID,
        note: String,
    ) -> Self {
        Self {
            id,
            date,
            amount,
            category_id,
            note,
        }
    }

    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// When the transaction happened.
    pub fn date(&self) -> Date {
        self.date
    }

    /// The amount of money spent or earned, in cents. Negative for expenses.
    pub fn amount(&self) -> Cents {
        self.amount
    }

    /// The category the transaction belongs to.
    pub fn category_id(&self) -> DatabaseID {
        self.category_id
    }

    /// A free text note on what the transaction was for.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// A copy of this transaction with `date` replaced.
    pub fn with_date(mut self, date: Date) -> Self {
        self.date = date;
        self
    }

    /// A copy of this transaction with `amount` replaced.
    pub fn with_amount(mut self, amount: Cents) -> Self {
        self.amount = amount;
        self
    }

    /// A copy of this transaction with `category_id` replaced.
    pub fn with_category(mut self, category_id: DatabaseID) -> Self {
        self.category_id = category_id;
        self
    }

    /// A copy of this transaction with `note` replaced.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }
}

/// Builder for creating a new [Transaction].
///
/// Finalize the builder by passing it to the transaction store's `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
    pub(crate) date: Date,
    pub(crate) amount: Cents,
    pub(crate) category_id: DatabaseID,
    pub(crate) note: String,
}

impl TransactionBuilder {
    /// Create a new transaction builder.
    ///
    /// The date defaults to today (UTC) and the note to an empty string.
    pub fn new(amount: Cents, category_id: DatabaseID) -> Self {
        Self {
            date: OffsetDateTime::now_utc().date(),
            amount,
            category_id,
            note: String::new(),
        }
    }

    /// Set the date for the transaction.
    pub fn date(mut self, date: Date) -> Self {
        self.date = date;
        self
    }

    /// Set the note for the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    /// The transaction this builder would create, given its row `id`.
    pub fn finalise(self, id: DatabaseID) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            category_id: self.category_id,
            note: self.note,
        }
    }
}
