//! A year-month period key, the unit budgets and KPI reports are scoped to.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// A calendar month, displayed and stored as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month {
    year: i32,
    // 1 through 12, kept as an integer so the derived ordering is chronological.
    month: u8,
}

impl Month {
    /// Create a month from a year and a one-based month number.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not in `1..=12`.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth(format!("{year:04}-{month:02}")));
        }

        Ok(Self { year, month })
    }

    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    /// Parse a `YYYY-MM` string.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `text` is not a valid year-month.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let error = || Error::InvalidMonth(text.to_string());

        let (year, month) = text.split_once('-').ok_or_else(error)?;

        if year.len() != 4 || month.len() != 2 {
            return Err(error());
        }

        let year: i32 = year.parse().map_err(|_| error())?;
        let month: u8 = month.parse().map_err(|_| error())?;

        Self::new(year, month).map_err(|_| error())
    }

    /// The year of the month.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The one-based month number.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The month immediately after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.time_month(), 1)
            .expect("day 1 is valid for every month")
    }

    /// The last day of the month.
    pub fn last_day(&self) -> Date {
        let day = time::util::days_in_year_month(self.year, self.time_month());

        Date::from_calendar_date(self.year, self.time_month(), day)
            .expect("days_in_year_month returns a valid day")
    }

    /// Whether `date` falls within the month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() as u8 == self.month
    }

    fn time_month(&self) -> time::Month {
        time::Month::try_from(self.month).expect("month is validated on construction")
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid month string in database")]
struct InvalidMonthValue;

impl ToSql for Month {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>, rusqlite::Error> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Month {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Month::parse(text).map_err(|_| FromSqlError::Other(Box::new(InvalidMonthValue)))
    }
}
