//! Defines the state object that holds the application's stores.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::stores::{BudgetStore, CategoryStore, RecurringStore, TransactionStore};

/// The handle to the application's storage, constructed once at startup and
/// passed explicitly to every component that needs it.
///
/// Generic over the store implementations so the aggregation, scheduler and
/// CSV code can be exercised against any backend.
#[derive(Debug, Clone)]
pub struct AppState<C, T, B, R>
where
    C: CategoryStore,
    T: TransactionStore,
    B: BudgetStore,
    R: RecurringStore,
{
    /// The shared database connection the stores operate on.
    db_connection: Arc<Mutex<Connection>>,
    /// The store for categories.
    pub category_store: C,
    /// The store for transactions.
    pub transaction_store: T,
    /// The store for monthly budgets.
    pub budget_store: B,
    /// The store for recurring templates.
    pub recurring_store: R,
}

impl<C, T, B, R> AppState<C, T, B, R>
where
    C: CategoryStore,
    T: TransactionStore,
    B: BudgetStore,
    R: RecurringStore,
{
    /// Create a new state object from the shared connection and the stores
    /// built on it.
    pub fn new(
        db_connection: Arc<Mutex<Connection>>,
        category_store: C,
        transaction_store: T,
        budget_store: B,
        recurring_store: R,
    ) -> Self {
        Self {
            db_connection,
            category_store,
            transaction_store,
            budget_store,
            recurring_store,
        }
    }

    /// The underlying database connection.
    pub fn db_connection(&self) -> &Mutex<Connection> {
        &self.db_connection
    }
}
