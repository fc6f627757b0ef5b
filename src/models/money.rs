//! Currency amounts as integer cents.
//!
//! Storing amounts as integers keeps sums exact: the KPI identity
//! `net == income - expense` and the CSV round-trip law hold without any
//! floating point drift. Decimal strings only exist at the CSV and CLI
//! boundary.

use crate::Error;

/// A currency amount in cents. Positive values are income, negative values
/// are expenses.
pub type Cents = i64;

/// Parse a plain decimal string such as `"-50"`, `"2000.5"` or `"12.34"`
/// into cents.
///
/// At most two fraction digits are accepted since the currency has two
/// decimal places.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `text` is not a decimal number with at
/// most two fraction digits.
pub fn parse_amount(text: &str) -> Result<Cents, Error> {
    let error = || Error::InvalidAmount(text.to_string());
    let text = text.trim();

    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(error());
    }

    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(error());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| error())?
    };

    let mut cents = whole.checked_mul(100).ok_or_else(error)?;

    if !fraction.is_empty() {
        let mut fraction_cents: i64 = fraction.parse().map_err(|_| error())?;
        if fraction.len() == 1 {
            fraction_cents *= 10;
        }
        cents = cents.checked_add(fraction_cents).ok_or_else(error)?;
    }

    Ok(sign * cents)
}

/// Format cents as a plain decimal string with two fraction digits,
/// e.g. `-5000` becomes `"-50.00"`.
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();

    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}
