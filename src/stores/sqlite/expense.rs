//! Implements a SQLite backed expense store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{ExpenseId, GroupId},
    db::{CreateTable, MapRow, get_decimal},
    expense::{Expense, NewExpense},
    stores::ExpenseStore,
};

use super::lock;

/// Create, retrieve, update and delete expenses.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store from the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                group_id INTEGER NOT NULL,
                participant_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(group_id) REFERENCES \"group\"(id) ON DELETE CASCADE,
                FOREIGN KEY(participant_id) REFERENCES participant(id)
            );

            CREATE INDEX IF NOT EXISTS idx_expense_group_id ON expense(group_id);",
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Expense {
            id: row.get(offset)?,
            group_id: row.get(offset + 1)?,
            participant_id: row.get(offset + 2)?,
            amount: get_decimal(row, offset + 3)?,
            currency: row.get(offset + 4)?,
            name: row.get(offset + 5)?,
            created_at: row.get(offset + 6)?,
        })
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Create a new expense, timestamped with the current time.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the group or participant does not exist.
    fn create(&self, expense: NewExpense) -> Result<Expense, Error> {
        lock(&self.connection)?
            .prepare(
                "INSERT INTO expense (group_id, participant_id, amount, currency, name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING id, group_id, participant_id, amount, currency, name, created_at",
            )?
            .query_row(
                (
                    expense.group_id,
                    expense.participant_id,
                    expense.amount.to_string(),
                    &expense.currency,
                    &expense.name,
                    OffsetDateTime::now_utc(),
                ),
                SQLiteExpenseStore::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                    },
                    _,
                ) => Error::NotFound,
                error => error.into(),
            })
    }

    fn get(&self, id: ExpenseId) -> Result<Expense, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, group_id, participant_id, amount, currency, name, created_at
                 FROM expense WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], SQLiteExpenseStore::map_row)
            .map_err(|error| error.into())
    }

    /// Update the payer, amount, currency and name of an expense.
    ///
    /// The group and creation time of an expense never change.
    fn update(&self, expense: &Expense) -> Result<Expense, Error> {
        lock(&self.connection)?
            .prepare(
                "UPDATE expense SET participant_id = ?1, amount = ?2, currency = ?3, name = ?4
                 WHERE id = ?5
                 RETURNING id, group_id, participant_id, amount, currency, name, created_at",
            )?
            .query_row(
                (
                    expense.participant_id,
                    expense.amount.to_string(),
                    &expense.currency,
                    &expense.name,
                    expense.id,
                ),
                SQLiteExpenseStore::map_row,
            )
            .map_err(|error| error.into())
    }

    fn delete(&self, id: ExpenseId) -> Result<(), Error> {
        let rows_affected =
            lock(&self.connection)?.execute("DELETE FROM expense WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Expense>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, group_id, participant_id, amount, currency, name, created_at
                 FROM expense WHERE group_id = :group_id
                 ORDER BY created_at ASC, id ASC",
            )?
            .query_map(&[(":group_id", &group_id)], SQLiteExpenseStore::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
            .collect()
    }
}
