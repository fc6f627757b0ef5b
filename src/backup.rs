//! Whole-file backup and restore of the SQLite database.
//!
//! The database file is treated as an opaque blob: backup is a byte-for-byte
//! copy and restore overwrites the store entirely. Both operate on a closed
//! database, so the CLI runs them before opening a connection.

use std::{fs, path::Path};

use crate::Error;

/// Copy the database file at `db_path` to `dest`.
///
/// # Errors
/// Returns an [Error::Io] if `db_path` cannot be read or `dest` cannot be
/// written.
pub fn backup(db_path: &Path, dest: &Path) -> Result<(), Error> {
    let bytes_copied = fs::copy(db_path, dest)?;
    tracing::info!("backed up {} byte(s) to {}", bytes_copied, dest.display());

    Ok(())
}

/// Replace the database file at `db_path` with the backup at `src`.
///
/// Any existing data at `db_path` is overwritten.
///
/// # Errors
/// Returns an [Error::Io] if `src` cannot be read or `db_path` cannot be
/// written.
pub fn restore(src: &Path, db_path: &Path) -> Result<(), Error> {
    let bytes_copied = fs::copy(src, db_path)?;
    tracing::info!(
        "restored {} byte(s) from {}",
        bytes_copied,
        src.display()
    );

    Ok(())
}

#[cfg(test)]
mod backup_tests {
    use std::fs;

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        models::{CategoryName, Transaction},
        stores::{
            CategoryStore, TransactionStore,
            sqlite::{SqlAppState, create_app_state},
        },
    };

    use super::{backup, restore};

    fn create_populated_database(db_path: &std::path::Path) -> SqlAppState {
        let connection = Connection::open(db_path).unwrap();
        let mut state = create_app_state(connection).unwrap();
        let category = state
            .category_store
            .create(CategoryName::new_unchecked("Books"), None)
            .unwrap();
        state
            .transaction_store
            .create(
                Transaction::build(-2_499, category.id())
                    .date(date!(2024 - 01 - 05))
                    .note("paperback"),
            )
            .unwrap();

        state
    }

    #[test]
    fn backup_copy_is_byte_identical() {
        let directory = tempfile::tempdir().unwrap();
        let db_path = directory.path().join("spendlog.db");
        let backup_path = directory.path().join("spendlog.backup");
        drop(create_populated_database(&db_path));

        backup(&db_path, &backup_path).unwrap();

        let want = fs::read(&db_path).unwrap();
        let got = fs::read(&backup_path).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn backup_fails_on_missing_source() {
        let directory = tempfile::tempdir().unwrap();
        let missing = directory.path().join("no-such.db");
        let backup_path = directory.path().join("spendlog.backup");

        let result = backup(&missing, &backup_path);

        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn restore_replaces_database_contents() {
        let directory = tempfile::tempdir().unwrap();
        let db_path = directory.path().join("spendlog.db");
        let backup_path = directory.path().join("spendlog.backup");

        drop(create_populated_database(&db_path));
        backup(&db_path, &backup_path).unwrap();

        // Wipe the live database, then bring the backup in over the top.
        let connection = Connection::open(&db_path).unwrap();
        let mut state = create_app_state(connection).unwrap();
        let transactions = state
            .transaction_store
            .get_query(Default::default())
            .unwrap();
        for transaction in &transactions {
            state.transaction_store.delete(transaction.id()).unwrap();
        }
        assert_eq!(state.transaction_store.count().unwrap(), 0);
        drop(state);

        restore(&backup_path, &db_path).unwrap();

        let connection = Connection::open(&db_path).unwrap();
        let state = create_app_state(connection).unwrap();
        assert_eq!(state.transaction_store.count().unwrap(), 1);
    }
}
