//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Transaction, TransactionBuilder},
    stores::{
        TransactionStore,
        transaction::{SortOrder, TransactionKind, TransactionQuery},
    },
};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction references a
/// [Category](crate::models::Category), the category table must be set up in
/// the database.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const COLUMNS: &str = "id, date, amount, category_id, note";

impl TransactionStore for SqliteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCategory] if the builder's category does not refer
    ///   to a valid category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let category_id = builder.category_id;

        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO \"transaction\" (date, amount, category_id, note)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, date, amount, category_id, note",
            )?
            .query_row(
                (
                    builder.date,
                    builder.amount,
                    builder.category_id,
                    builder.note,
                ),
                Self::map_row,
            )
            .map_err(|error| match error {
                // Code 787 occurs when a FOREIGN KEY constraint failed.
                // The client tried to add a transaction for a non-existent
                // category.
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 787 =>
                {
                    Error::InvalidCategory(Some(category_id))
                }
                error => error.into(),
            })?;

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn get_query(&self, query: TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM \"transaction\"")];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(date_range) = query.date_range {
            where_clause_parts.push(format!(
                "date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(date_range.start().to_string()));
            query_parameters.push(Value::Text(date_range.end().to_string()));
        }

        if let Some(category_id) = query.category_id {
            where_clause_parts.push(format!("category_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(category_id));
        }

        match query.kind {
            Some(TransactionKind::Income) => where_clause_parts.push("amount >= 0".to_string()),
            Some(TransactionKind::Expense) => where_clause_parts.push("amount < 0".to_string()),
            None => {}
        }

        if let Some(min_amount) = query.min_amount {
            where_clause_parts.push(format!("ABS(amount) >= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(min_amount));
        }

        if let Some(max_amount) = query.max_amount {
            where_clause_parts.push(format!("ABS(amount) <= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(max_amount));
        }

        if let Some(text) = query.note_contains {
            where_clause_parts.push(format!(
                "note LIKE ?{} ESCAPE '\\'",
                query_parameters.len() + 1
            ));
            let escaped = text
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            query_parameters.push(Value::Text(format!("%{escaped}%")));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        match query.sort_date {
            Some(SortOrder::Ascending) => query_string_parts.push("ORDER BY date ASC".to_string()),
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY date DESC".to_string())
            }
            None => {}
        }

        if let Some(limit) = query.limit {
            query_string_parts.push(format!("LIMIT {limit} OFFSET {}", query.offset));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| {
                maybe_transaction.map_err(|error| Error::SqlError(std::sync::Arc::new(error)))
            })
            .collect()
    }

    /// Overwrite the stored transaction with the same id as `transaction`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no transaction has the id,
    /// - [Error::InvalidCategory] if the new category does not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, transaction: &Transaction) -> Result<(), Error> {
        let rows_updated = self
            .connection
            .lock()
            .unwrap()
            .execute(
                "UPDATE \"transaction\"
                 SET date = ?1, amount = ?2, category_id = ?3, note = ?4
                 WHERE id = ?5",
                (
                    transaction.date(),
                    transaction.amount(),
                    transaction.category_id(),
                    transaction.note(),
                    transaction.id(),
                ),
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(sql_error, Some(_))
                    if sql_error.extended_code == 787 =>
                {
                    Error::InvalidCategory(Some(transaction.category_id()))
                }
                error => error.into(),
            })?;

        if rows_updated == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete a transaction from the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Get the total number of transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is some SQL
    /// error.
    fn count(&self) -> Result<usize, Error> {
        self.connection
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
                row.get(0)
            })
            .map_err(|error| error.into())
    }
}

impl CreateTable for SqliteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    amount INTEGER NOT NULL,
                    category_id INTEGER NOT NULL,
                    note TEXT NOT NULL DEFAULT '',
                    FOREIGN KEY(category_id) REFERENCES category(id)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let date = row.get(offset + 1)?;
        let amount = row.get(offset + 2)?;
        let category_id = row.get(offset + 3)?;
        let note = row.get(offset + 4)?;

        Ok(Transaction::new_unchecked(
            id,
            date,
            amount,
            category_id,
            note,
        ))
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        models::{CategoryName, DatabaseID, Transaction},
        stores::{
            CategoryStore, TransactionStore,
            sqlite::{SqlAppState, create_app_state},
            transaction::{SortOrder, TransactionKind, TransactionQuery},
        },
    };

    fn get_app_state() -> SqlAppState {
        let connection = Connection::open_in_memory().unwrap();
        create_app_state(connection).unwrap()
    }

    fn get_app_state_and_category() -> (SqlAppState, DatabaseID) {
        let mut state = get_app_state();
        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Groceries"), None)
            .unwrap();
        let category_id = category.id();

        (state, category_id)
    }

    #[test]
    fn create_succeeds() {
        let (mut state, category_id) = get_app_state_and_category();

        let transaction = state
            .transaction_store
            .create(
                Transaction::build(-5_000, category_id)
                    .date(date!(2024 - 01 - 05))
                    .note("weekly shop"),
            )
            .unwrap();

        assert_eq!(transaction.amount(), -5_000);
        assert_eq!(transaction.date(), date!(2024 - 01 - 05));
        assert_eq!(transaction.category_id(), category_id);
        assert_eq!(transaction.note(), "weekly shop");
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let mut state = get_app_state();

        let transaction = state
            .transaction_store
            .create(Transaction::build(-5_000, 99_999));

        assert_eq!(transaction, Err(Error::InvalidCategory(Some(99_999))));
    }

    #[test]
    fn get_transaction_by_id_succeeds() {
        let (mut state, category_id) = get_app_state_and_category();
        let transaction = state
            .transaction_store
            .create(Transaction::build(123_45, category_id))
            .unwrap();

        let selected_transaction = state.transaction_store.get(transaction.id());

        assert_eq!(Ok(transaction), selected_transaction);
    }

    #[test]
    fn get_transaction_fails_on_invalid_id() {
        let (mut state, category_id) = get_app_state_and_category();
        let transaction = state
            .transaction_store
            .create(Transaction::build(123_45, category_id))
            .unwrap();

        let maybe_transaction = state.transaction_store.get(transaction.id() + 654);

        assert_eq!(maybe_transaction, Err(Error::NotFound));
    }

    #[test]
    fn get_transactions_by_date_range() {
        let (mut state, category_id) = get_app_state_and_category();

        let want = [
            state
                .transaction_store
                .create(Transaction::build(-1_000, category_id).date(date!(2024 - 01 - 01)))
                .unwrap(),
            state
                .transaction_store
                .create(Transaction::build(-2_000, category_id).date(date!(2024 - 01 - 20)))
                .unwrap(),
        ];

        // The below transactions should NOT be returned by the query.
        for date in [date!(2023 - 12 - 31), date!(2024 - 02 - 01)] {
            state
                .transaction_store
                .create(Transaction::build(-99_999, category_id).date(date))
                .unwrap();
        }

        let got = state
            .transaction_store
            .get_query(TransactionQuery::for_dates(
                date!(2024 - 01 - 01)..=date!(2024 - 01 - 31),
            ))
            .unwrap();

        assert_eq!(got, want, "got transactions {got:?}, want {want:?}");
    }

    #[test]
    fn get_transactions_by_category() {
        let (mut state, category_id) = get_app_state_and_category();
        let other_category = state
            .category_store
            .create(CategoryName::new_unchecked("Rent"), None)
            .unwrap();
        let want = vec![
            state
                .transaction_store
                .create(Transaction::build(-1_000, category_id))
                .unwrap(),
        ];
        state
            .transaction_store
            .create(Transaction::build(-2_000, other_category.id()))
            .unwrap();

        let got = state
            .transaction_store
            .get_query(TransactionQuery {
                category_id: Some(category_id),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn get_transactions_by_kind() {
        let (mut state, category_id) = get_app_state_and_category();
        let expense = state
            .transaction_store
            .create(Transaction::build(-5_000, category_id))
            .unwrap();
        let income = state
            .transaction_store
            .create(Transaction::build(200_000, category_id))
            .unwrap();

        let expenses = state
            .transaction_store
            .get_query(TransactionQuery {
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            })
            .unwrap();
        let income_rows = state
            .transaction_store
            .get_query(TransactionQuery {
                kind: Some(TransactionKind::Income),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(expenses, vec![expense]);
        assert_eq!(income_rows, vec![income]);
    }

    #[test]
    fn get_transactions_by_amount_range() {
        let (mut state, category_id) = get_app_state_and_category();
        state
            .transaction_store
            .create(Transaction::build(-100, category_id))
            .unwrap();
        let want = vec![
            state
                .transaction_store
                .create(Transaction::build(-5_000, category_id))
                .unwrap(),
        ];
        state
            .transaction_store
            .create(Transaction::build(100_000, category_id))
            .unwrap();

        // Amount bounds apply to the absolute value, so the sign of an
        // expense does not invert the range.
        let got = state
            .transaction_store
            .get_query(TransactionQuery {
                min_amount: Some(1_000),
                max_amount: Some(10_000),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn get_transactions_by_note_text() {
        let (mut state, category_id) = get_app_state_and_category();
        let want = vec![
            state
                .transaction_store
                .create(Transaction::build(-5_000, category_id).note("weekly shop"))
                .unwrap(),
        ];
        state
            .transaction_store
            .create(Transaction::build(-2_000, category_id).note("petrol"))
            .unwrap();

        let got = state
            .transaction_store
            .get_query(TransactionQuery {
                note_contains: Some("shop".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn note_search_escapes_like_wildcards() {
        let (mut state, category_id) = get_app_state_and_category();
        state
            .transaction_store
            .create(Transaction::build(-5_000, category_id).note("100 pct"))
            .unwrap();
        let want = vec![
            state
                .transaction_store
                .create(Transaction::build(-2_000, category_id).note("100% cotton"))
                .unwrap(),
        ];

        let got = state
            .transaction_store
            .get_query(TransactionQuery {
                note_contains: Some("100%".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn get_transactions_descending_date() {
        let (mut state, category_id) = get_app_state_and_category();

        let mut want = vec![];
        for (amount, date) in [
            (-1_000, date!(2024 - 01 - 05)),
            (-2_000, date!(2024 - 01 - 10)),
            (-3_000, date!(2024 - 01 - 15)),
        ] {
            want.push(
                state
                    .transaction_store
                    .create(Transaction::build(amount, category_id).date(date))
                    .unwrap(),
            );
        }

        want.sort_by(|a, b| b.date().cmp(&a.date()));

        let got = state
            .transaction_store
            .get_query(TransactionQuery {
                sort_date: Some(SortOrder::Descending),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            got, want,
            "got transactions that were not sorted in descending order"
        );
    }

    #[test]
    fn get_transactions_with_limit_and_offset() {
        let (mut state, category_id) = get_app_state_and_category();
        let offset = 10;
        let limit = 5;
        let mut want = Vec::new();
        for i in 1..20 {
            let transaction = state
                .transaction_store
                .create(Transaction::build(i, category_id))
                .expect("Could not create transaction");

            if i > offset && i <= offset + limit {
                want.push(transaction);
            }
        }

        let got = state
            .transaction_store
            .get_query(TransactionQuery {
                offset: offset as u64,
                limit: Some(limit as u64),
                ..Default::default()
            })
            .expect("Could not query store");

        assert_eq!(want, got);
    }

    #[test]
    fn update_overwrites_fields() {
        let (mut state, category_id) = get_app_state_and_category();
        let transaction = state
            .transaction_store
            .create(Transaction::build(-5_000, category_id))
            .unwrap();

        let want = transaction
            .with_date(date!(2024 - 02 - 02))
            .with_amount(-7_500)
            .with_note("updated");
        state.transaction_store.update(&want).unwrap();

        let got = state.transaction_store.get(want.id()).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn update_fails_on_invalid_id() {
        let (mut state, category_id) = get_app_state_and_category();
        let transaction = state
            .transaction_store
            .create(Transaction::build(-5_000, category_id))
            .unwrap();
        state.transaction_store.delete(transaction.id()).unwrap();

        let result = state.transaction_store.update(&transaction);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_fails_on_invalid_category() {
        let (mut state, category_id) = get_app_state_and_category();
        let transaction = state
            .transaction_store
            .create(Transaction::build(-5_000, category_id))
            .unwrap();

        let result = state
            .transaction_store
            .update(&transaction.with_category(99_999));

        assert_eq!(result, Err(Error::InvalidCategory(Some(99_999))));
    }

    #[test]
    fn delete_removes_transaction() {
        let (mut state, category_id) = get_app_state_and_category();
        let transaction = state
            .transaction_store
            .create(Transaction::build(-5_000, category_id))
            .unwrap();

        state.transaction_store.delete(transaction.id()).unwrap();

        assert_eq!(
            state.transaction_store.get(transaction.id()),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_fails_on_invalid_id() {
        let mut state = get_app_state();

        let result = state.transaction_store.delete(99_999);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_count() {
        let (mut state, category_id) = get_app_state_and_category();
        let want_count = 20;
        for i in 1..=want_count {
            state
                .transaction_store
                .create(Transaction::build(i as i64, category_id))
                .expect("Could not create transaction");
        }

        let got_count = state
            .transaction_store
            .count()
            .expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
