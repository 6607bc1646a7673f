/*! This module defines the traits shared by the SQLite stores and the function that prepares a database for the application. */

use std::str::FromStr;

use rusqlite::{Connection, Row, Transaction as SqlTransaction, types::Type};
use rust_decimal::Decimal;

use crate::{
    Error,
    stores::sqlite::{
        SQLiteExpenseStore, SQLiteGroupStore, SQLiteParticipantStore, SQLiteSummaryStore,
        SQLiteTransferStore,
    },
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create the table(s) for the model if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type produced from a row.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading from column `offset` onwards.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Read a decimal that was stored as TEXT.
///
/// Amounts are stored as text so that SQLite never rounds them through a
/// floating point representation.
pub(crate) fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

/// Create the tables for the domain models.
///
/// Foreign keys are switched on for `connection` so that removing a group
/// cascades to the rows that belong to it.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SQLiteParticipantStore::create_table(&transaction)?;
    SQLiteGroupStore::create_table(&transaction)?;
    SQLiteExpenseStore::create_table(&transaction)?;
    SQLiteTransferStore::create_table(&transaction)?;
    SQLiteSummaryStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
