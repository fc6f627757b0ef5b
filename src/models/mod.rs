//! This module defines the domain data types.

pub use budget::Budget;
pub use category::{Category, CategoryName};
pub use money::{Cents, format_cents, parse_amount};
pub use month::Month;
pub use recurring::{Recurrence, RecurringTemplate};
pub use transaction::{Transaction, TransactionBuilder};

mod budget;
mod category;
mod money;
mod month;
mod recurring;
mod transaction;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
