//! Transaction data aggregation for the dashboard KPIs, category
//! breakdowns, monthly trends and budget comparison.
//!
//! All functions are pure over slices: callers fetch the transactions for
//! the period of interest from the store and pass them in.

use std::collections::HashMap;

use crate::models::{Budget, Cents, DatabaseID, Month, Transaction};

/// The summary numbers shown at the top of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Kpis {
    /// Sum of all non-negative amounts, in cents.
    pub total_income: Cents,
    /// Sum of the magnitudes of all negative amounts, in cents. Always
    /// non-negative.
    pub total_expense: Cents,
    /// `total_income - total_expense`.
    pub net: Cents,
    /// The number of transactions summarised.
    pub count: usize,
}

/// Income and expense totals for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthlyTotals {
    /// Sum of all non-negative amounts, in cents.
    pub income: Cents,
    /// Sum of the magnitudes of all negative amounts, in cents.
    pub expense: Cents,
}

/// Actual spend measured against the budgeted target for one category in
/// one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetComparison {
    /// The category the budget applies to.
    pub category_id: DatabaseID,
    /// The month the budget applies to.
    pub month: Month,
    /// The budgeted target spend, in cents.
    pub target: Cents,
    /// The expense magnitude actually spent, in cents.
    pub actual: Cents,
    /// `actual - target`. Positive means over budget.
    pub variance: Cents,
}

/// Compute the summary KPIs over `transactions`.
///
/// Amounts are integer cents, so `net == total_income - total_expense` holds
/// exactly.
pub fn compute_kpis(transactions: &[Transaction]) -> Kpis {
    let mut kpis = Kpis::default();

    for transaction in transactions {
        if transaction.amount() < 0 {
            kpis.total_expense += -transaction.amount();
        } else {
            kpis.total_income += transaction.amount();
        }
    }

    kpis.net = kpis.total_income - kpis.total_expense;
    kpis.count = transactions.len();

    kpis
}

/// Sum transaction amounts per category.
///
/// Every category with at least one transaction in the input appears exactly
/// once; categories with no transactions do not appear at all.
pub fn category_breakdown(transactions: &[Transaction]) -> HashMap<DatabaseID, Cents> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category_id()).or_insert(0) += transaction.amount();
    }

    totals
}

/// Aggregate income and expense totals by month, for the month-over-month
/// trend.
pub fn monthly_totals(transactions: &[Transaction]) -> HashMap<Month, MonthlyTotals> {
    let mut totals: HashMap<Month, MonthlyTotals> = HashMap::new();

    for transaction in transactions {
        let entry = totals
            .entry(Month::from_date(transaction.date()))
            .or_default();

        if transaction.amount() < 0 {
            entry.expense += -transaction.amount();
        } else {
            entry.income += transaction.amount();
        }
    }

    totals
}

/// Measure actual spend against each stored budget.
///
/// Only expenses count towards `actual`; income in a budgeted category does
/// not offset spending. A `(category, month)` with no budget row is never
/// present in the output, and a budget with no spending yields an entry
/// with `actual` of zero.
pub fn compare_to_budget(
    budgets: &[Budget],
    transactions: &[Transaction],
) -> Vec<BudgetComparison> {
    budgets
        .iter()
        .map(|budget| {
            let actual = transactions
                .iter()
                .filter(|transaction| {
                    transaction.category_id() == budget.category_id()
                        && transaction.amount() < 0
                        && budget.month().contains(transaction.date())
                })
                .map(|transaction| -transaction.amount())
                .sum();

            BudgetComparison {
                category_id: budget.category_id(),
                month: budget.month(),
                target: budget.amount(),
                actual,
                variance: actual - budget.amount(),
            }
        })
        .collect()
}
