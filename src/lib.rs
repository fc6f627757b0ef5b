//! Spendlog is a single-user personal finance tracker: transaction entry,
//! category tagging, monthly budgets, recurring-payment auto-posting, CSV
//! import/export and whole-file database backup.
//!
//! This library provides the storage and reporting core; the `spendlog`
//! binary is a thin CLI over it. All amounts are integer cents, so sums are
//! exact and exporting then re-importing a ledger reproduces it digit for
//! digit.

#![warn(missing_docs)]

pub mod aggregation;
pub mod backup;
pub mod csv;
mod db;
mod error;
pub mod models;
pub mod recurring;
mod state;
pub mod stores;

pub use db::initialize;
pub use error::Error;
pub use state::AppState;
