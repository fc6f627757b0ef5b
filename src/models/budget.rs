//! This file defines the `Budget` type: a target spend amount for a category
//! in a given month.

use serde::{Deserialize, Serialize};

use crate::models::{Cents, DatabaseID, Month};

/// A monthly spending target for one category.
///
/// At most one budget exists per `(category, month)` pair; the budget store
/// enforces this with upsert semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    id: DatabaseID,
    category_id: DatabaseID,
    month: Month,
    amount: Cents,
}

impl Budget {
    /// Create a new budget.
    pub fn new(id: DatabaseID, category_id: DatabaseID, month: Month, amount: Cents) -> Self {
        Self {
            id,
            category_id,
            month,
            amount,
        }
    }

    /// The id of the budget row.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The category this budget applies to.
    pub fn category_id(&self) -> DatabaseID {
        self.category_id
    }

    /// The month this budget applies to.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The target spend for the month, in cents.
    pub fn amount(&self) -> Cents {
        self.amount
    }
}
