//! CSV export and import of transactions.
//!
//! The exchange format is a fixed four column layout:
//!
//! ```text
//! date,amount,category,note
//! 2024-01-05,-50.00,Food,groceries
//! ```
//!
//! Dates are ISO-8601 calendar dates, amounts are plain decimal strings and
//! categories are referenced by name. Exporting and then importing against
//! unchanged categories reproduces the transaction set exactly.

use std::io;

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    models::{Category, CategoryName, Transaction, format_cents, parse_amount},
    state::AppState,
    stores::{BudgetStore, CategoryStore, RecurringStore, TransactionStore},
};

/// The column layout every exported and imported file uses.
pub const CSV_HEADER: [&str; 4] = ["date", "amount", "category", "note"];

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// A row that could not be imported, with the reason it was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// The 1-based line number of the row in the input.
    pub line: u64,
    /// Why the row was rejected.
    pub reason: Error,
}

/// The outcome of a CSV import.
///
/// A rejected row never aborts the batch, so a summary can hold both
/// imported transactions and rejections.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    /// The transactions that were inserted, in input order.
    pub imported: Vec<Transaction>,
    /// The rows that were rejected, in input order.
    pub rejected: Vec<RejectedRow>,
}

/// Write `transactions` as CSV.
///
/// Categories are written by name, looked up in `categories`.
///
/// # Errors
/// Returns an:
/// - [Error::InvalidCategory] if a transaction references a category that is
///   not in `categories`,
/// - or [Error::Io] if writing fails.
pub fn export_csv<W: io::Write>(
    transactions: &[Transaction],
    categories: &[Category],
    writer: W,
) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for transaction in transactions {
        let category = categories
            .iter()
            .find(|category| category.id() == transaction.category_id())
            .ok_or(Error::InvalidCategory(Some(transaction.category_id())))?;

        let date = transaction
            .date()
            .format(DATE_FORMAT)
            .map_err(|error| Error::Io(error.to_string()))?;

        csv_writer.write_record([
            date.as_str(),
            &format_cents(transaction.amount()),
            category.name().as_ref(),
            transaction.note(),
        ])?;
    }

    csv_writer.flush()?;

    Ok(())
}

/// Read transactions from CSV and insert them into the store.
///
/// Each row is validated independently: the date must be an ISO-8601
/// calendar date, the amount a decimal string with at most two fraction
/// digits, and the category is resolved by name or created if it does not
/// exist yet. The note column may be omitted. Rows that fail validation are
/// collected in the summary with the reason and do not stop the rest of the
/// batch.
///
/// # Errors
/// Returns an:
/// - [Error::InvalidCsv] if the header row is missing or does not match
///   [CSV_HEADER],
/// - or [Error::SqlError] if inserting a valid row fails.
pub fn import_csv<Rd, C, T, B, R>(
    reader: Rd,
    state: &mut AppState<C, T, B, R>,
) -> Result<ImportSummary, Error>
where
    Rd: io::Read,
    C: CategoryStore,
    T: TransactionStore,
    B: BudgetStore,
    R: RecurringStore,
{
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|error| Error::InvalidCsv(error.to_string()))?;

    if headers.iter().collect::<Vec<_>>() != CSV_HEADER {
        return Err(Error::InvalidCsv(format!(
            "expected header \"{}\", got \"{}\"",
            CSV_HEADER.join(","),
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut summary = ImportSummary::default();

    for (index, record) in csv_reader.records().enumerate() {
        // The header occupies line one.
        let line = index as u64 + 2;

        let record = match record {
            Ok(record) => record,
            Err(error) => {
                summary.rejected.push(RejectedRow {
                    line: error.position().map(|p| p.line()).unwrap_or(line),
                    reason: Error::InvalidCsv(error.to_string()),
                });
                continue;
            }
        };

        match import_row(&record, state) {
            Ok(transaction) => summary.imported.push(transaction),
            // Insertion failures other than validation mean the database
            // itself is unhappy, so stop the batch.
            Err(error @ Error::SqlError(_)) => return Err(error),
            Err(reason) => summary.rejected.push(RejectedRow { line, reason }),
        }
    }

    tracing::info!(
        "imported {} transaction(s), rejected {} row(s)",
        summary.imported.len(),
        summary.rejected.len()
    );

    Ok(summary)
}

fn import_row<C, T, B, R>(
    record: &csv::StringRecord,
    state: &mut AppState<C, T, B, R>,
) -> Result<Transaction, Error>
where
    C: CategoryStore,
    T: TransactionStore,
    B: BudgetStore,
    R: RecurringStore,
{
    let date_text = record
        .get(0)
        .ok_or_else(|| Error::InvalidCsv("missing date column".to_string()))?;
    let date = Date::parse(date_text, DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(date_text.to_string()))?;

    let amount = parse_amount(
        record
            .get(1)
            .ok_or_else(|| Error::InvalidCsv("missing amount column".to_string()))?,
    )?;

    let name = CategoryName::new(
        record
            .get(2)
            .ok_or_else(|| Error::InvalidCsv("missing category column".to_string()))?,
    )?;
    let category = match state.category_store.get_by_name(&name) {
        Ok(category) => category,
        Err(Error::NotFound) => state.category_store.create(name, None)?,
        Err(error) => return Err(error),
    };

    let note = record.get(3).unwrap_or_default();

    state.transaction_store.create(
        Transaction::build(amount, category.id())
            .date(date)
            .note(note),
    )
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        match value.kind() {
            csv::ErrorKind::Io(io_error) => Error::Io(io_error.to_string()),
            _ => Error::InvalidCsv(value.to_string()),
        }
    }
}
