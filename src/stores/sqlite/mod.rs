//! Contains the SQLite backed stores and a convenience function for creating
//! an [AppState] that uses them.

mod expense;
mod group;
mod participant;
mod summary;
mod transfer;

pub use expense::SQLiteExpenseStore;
pub use group::SQLiteGroupStore;
pub use participant::SQLiteParticipantStore;
pub use summary::SQLiteSummaryStore;
pub use transfer::SQLiteTransferStore;

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{AppState, Error, db::initialize};

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState = AppState<
    SQLiteExpenseStore,
    SQLiteGroupStore,
    SQLiteParticipantStore,
    SQLiteTransferStore,
    SQLiteSummaryStore,
>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(db_connection: Connection) -> Result<SQLAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        SQLiteExpenseStore::new(connection.clone()),
        SQLiteGroupStore::new(connection.clone()),
        SQLiteParticipantStore::new(connection.clone()),
        SQLiteTransferStore::new(connection.clone()),
        SQLiteSummaryStore::new(connection),
    ))
}

/// Lock the shared connection, mapping a poisoned lock to an [Error].
fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|_| Error::DatabaseLockError)
}
