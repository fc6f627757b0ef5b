//! This file defines the `RecurringTemplate` type and its recurrence rule.
//! A template auto-generates transactions on a schedule when the posting
//! pass runs.

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error,
    models::{Cents, DatabaseID, Month},
};

/// How often a recurring template posts a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    /// Post every seven days.
    Weekly,
    /// Post once a month on the same day, clamped to the length of the
    /// target month (a template due on the 31st posts on Feb 28/29).
    Monthly,
}

impl Recurrence {
    /// The due date that follows `from`.
    pub fn advance(&self, from: Date) -> Date {
        match self {
            Recurrence::Weekly => from + Duration::weeks(1),
            Recurrence::Monthly => {
                let month = Month::from_date(from).next();
                let day = from.day().min(month.last_day().day());

                month
                    .first_day()
                    .replace_day(day)
                    .expect("day is clamped to the target month's length")
            }
        }
    }

    /// The string stored in the database for this rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    /// Parse the stored string form of a rule.
    ///
    /// # Errors
    /// Returns [Error::InvalidCsv] wrapping the text if it is not a known
    /// rule name.
    pub fn parse(text: &str) -> Result<Self, Error> {
        match text {
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(Error::InvalidCsv(format!("unknown recurrence {other:?}"))),
        }
    }
}

/// A rule that auto-generates transactions on a schedule.
///
/// Only the posting pass advances `next_due`; user edits replace the rule
/// wholesale through the recurring store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    id: DatabaseID,
    category_id: DatabaseID,
    amount: Cents,
    note: String,
    recurrence: Recurrence,
    next_due: Date,
}

impl RecurringTemplate {
    /// Create a new recurring template.
    pub fn new(
        id: DatabaseID,
        category_id: DatabaseID,
        amount: Cents,
        note: String,
        recurrence: Recurrence,
        next_due: Date,
    ) -> Self {
        Self {
            id,
            category_id,
            amount,
            note,
            recurrence,
            next_due,
        }
    }

    /// The id of the template.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The category posted transactions belong to.
    pub fn category_id(&self) -> DatabaseID {
        self.category_id
    }

    /// The amount each posted transaction carries, in cents.
    pub fn amount(&self) -> Cents {
        self.amount
    }

    /// The note copied onto each posted transaction.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// How often the template posts.
    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    /// The next date the template is due to post on.
    pub fn next_due(&self) -> Date {
        self.next_due
    }

    /// A copy of this template with `next_due` replaced.
    pub fn with_next_due(mut self, next_due: Date) -> Self {
        self.next_due = next_due;
        self
    }
}
