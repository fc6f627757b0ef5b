//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).

mod budget;
mod category;
mod recurring;
mod transaction;

pub mod sqlite;

pub use budget::BudgetStore;
pub use category::{CategoryDeleteMode, CategoryStore};
pub use recurring::RecurringStore;
pub use transaction::{SortOrder, TransactionKind, TransactionQuery, TransactionStore};
