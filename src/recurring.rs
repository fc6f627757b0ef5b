//! The recurring-posting pass.
//!
//! An explicit, independently callable operation rather than a background
//! task: the CLI runs it on demand and a UI would run it on startup.

use time::Date;

use crate::{
    Error,
    models::Transaction,
    state::AppState,
    stores::{BudgetStore, CategoryStore, RecurringStore, TransactionStore},
};

/// Post a transaction for every recurring template that is due on or before
/// `today`, advancing each template's next due date past `today`.
///
/// A template that has missed several periods posts one transaction per
/// missed due date in a single catch-up pass. The due date advances
/// monotonically and is persisted per template, so running the pass twice
/// in succession posts nothing the second time.
///
/// Returns the transactions that were posted.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error. Templates
/// processed before the failure stay posted; their due dates have already
/// been advanced.
pub fn post_due<C, T, B, R>(
    state: &mut AppState<C, T, B, R>,
    today: Date,
) -> Result<Vec<Transaction>, Error>
where
    C: CategoryStore,
    T: TransactionStore,
    B: BudgetStore,
    R: RecurringStore,
{
    let mut posted = Vec::new();

    for template in state.recurring_store.get_all()? {
        let mut due_date = template.next_due();

        while due_date <= today {
            let transaction = state.transaction_store.create(
                Transaction::build(template.amount(), template.category_id())
                    .date(due_date)
                    .note(template.note()),
            )?;

            posted.push(transaction);
            due_date = template.recurrence().advance(due_date);
        }

        if due_date != template.next_due() {
            // Persist the advance before moving to the next template so a
            // failure part way cannot double-post this one later.
            state.recurring_store.set_next_due(template.id(), due_date)?;
        }
    }

    if !posted.is_empty() {
        tracing::info!("posted {} recurring transaction(s)", posted.len());
    }

    Ok(posted)
}

#[cfg(test)]
mod post_due_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        models::{CategoryName, DatabaseID, Recurrence},
        stores::{
            CategoryStore, RecurringStore, TransactionStore,
            sqlite::{SqlAppState, create_app_state},
        },
    };

    use super::post_due;

    fn get_app_state_and_category() -> (SqlAppState, DatabaseID) {
        let connection = Connection::open_in_memory().unwrap();
        let mut state = create_app_state(connection).unwrap();
        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Bills"), None)
            .unwrap();
        let category_id = category.id();

        (state, category_id)
    }

    #[test]
    fn posts_nothing_before_due_date() {
        let (mut state, category_id) = get_app_state_and_category();
        state
            .recurring_store
            .create(
                category_id,
                -10_000,
                "",
                Recurrence::Monthly,
                date!(2024 - 03 - 01),
            )
            .unwrap();

        let posted = post_due(&mut state, date!(2024 - 02 - 29)).unwrap();

        assert!(posted.is_empty());
        assert_eq!(state.transaction_store.count().unwrap(), 0);
    }

    #[test]
    fn posts_single_due_template() {
        let (mut state, category_id) = get_app_state_and_category();
        state
            .recurring_store
            .create(
                category_id,
                -10_000,
                "power bill",
                Recurrence::Monthly,
                date!(2024 - 03 - 01),
            )
            .unwrap();

        let posted = post_due(&mut state, date!(2024 - 03 - 01)).unwrap();

        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].date(), date!(2024 - 03 - 01));
        assert_eq!(posted[0].amount(), -10_000);
        assert_eq!(posted[0].note(), "power bill");

        let templates = state.recurring_store.get_all().unwrap();
        assert_eq!(templates[0].next_due(), date!(2024 - 04 - 01));
    }

    #[test]
    fn catches_up_missed_periods() {
        let (mut state, category_id) = get_app_state_and_category();
        state
            .recurring_store
            .create(
                category_id,
                -10_000,
                "",
                Recurrence::Monthly,
                date!(2024 - 01 - 15),
            )
            .unwrap();

        // Three months late: January, February and March are all due.
        let posted = post_due(&mut state, date!(2024 - 03 - 20)).unwrap();

        let want_dates = [
            date!(2024 - 01 - 15),
            date!(2024 - 02 - 15),
            date!(2024 - 03 - 15),
        ];
        let got_dates: Vec<_> = posted.iter().map(|transaction| transaction.date()).collect();
        assert_eq!(got_dates, want_dates);

        let templates = state.recurring_store.get_all().unwrap();
        assert_eq!(templates[0].next_due(), date!(2024 - 04 - 15));
    }

    #[test]
    fn second_run_posts_nothing() {
        let (mut state, category_id) = get_app_state_and_category();
        state
            .recurring_store
            .create(
                category_id,
                -10_000,
                "",
                Recurrence::Monthly,
                date!(2024 - 01 - 15),
            )
            .unwrap();
        let today = date!(2024 - 03 - 20);

        let first = post_due(&mut state, today).unwrap();
        let second = post_due(&mut state, today).unwrap();

        assert_eq!(first.len(), 3);
        assert!(
            second.is_empty(),
            "second run must be idempotent, got {second:?}"
        );
        assert_eq!(state.transaction_store.count().unwrap(), 3);
    }

    #[test]
    fn weekly_templates_advance_by_week() {
        let (mut state, category_id) = get_app_state_and_category();
        state
            .recurring_store
            .create(
                category_id,
                -2_500,
                "",
                Recurrence::Weekly,
                date!(2024 - 01 - 01),
            )
            .unwrap();

        let posted = post_due(&mut state, date!(2024 - 01 - 15)).unwrap();

        let got_dates: Vec<_> = posted.iter().map(|transaction| transaction.date()).collect();
        assert_eq!(
            got_dates,
            [
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 08),
                date!(2024 - 01 - 15)
            ]
        );
    }
}
