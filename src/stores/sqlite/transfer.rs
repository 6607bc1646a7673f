//! Implements a SQLite backed transfer store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, Transaction};

use crate::{
    Error,
    database_id::GroupId,
    db::{CreateTable, MapRow, get_decimal},
    reconcile::{Reconciled, Reconciliation},
    stores::TransferStore,
    transfer::{NewTransfer, Transfer},
};

use super::lock;

/// Stores the transfers that settle each group.
#[derive(Debug, Clone)]
pub struct SQLiteTransferStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransferStore {
    /// Create a new store from the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteTransferStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS transfer (
                id INTEGER PRIMARY KEY,
                group_id INTEGER NOT NULL,
                from_participant_id INTEGER NOT NULL,
                to_participant_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                UNIQUE(group_id, from_participant_id, to_participant_id),
                FOREIGN KEY(group_id) REFERENCES \"group\"(id) ON DELETE CASCADE
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransferStore {
    type ReturnType = Transfer;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Transfer {
            id: row.get(offset)?,
            group_id: row.get(offset + 1)?,
            from_participant_id: row.get(offset + 2)?,
            to_participant_id: row.get(offset + 3)?,
            amount: get_decimal(row, offset + 4)?,
            currency: row.get(offset + 5)?,
        })
    }
}

fn apply_row(
    group_id: GroupId,
    row: Reconciled<NewTransfer>,
    transaction: &Transaction,
) -> Result<Transfer, Error> {
    match row {
        Reconciled::Update { id, row } => {
            let rows_affected = transaction.execute(
                "UPDATE transfer SET amount = ?1, currency = ?2 WHERE id = ?3 AND group_id = ?4",
                (row.amount.to_string(), &row.currency, id, group_id),
            )?;

            if rows_affected == 0 {
                return Err(Error::NotFound);
            }

            Ok(row.with_id(id))
        }
        Reconciled::Insert(row) => {
            transaction.execute(
                "INSERT INTO transfer
                    (group_id, from_participant_id, to_participant_id, amount, currency)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    group_id,
                    row.from_participant_id,
                    row.to_participant_id,
                    row.amount.to_string(),
                    &row.currency,
                ),
            )?;

            Ok(row.with_id(transaction.last_insert_rowid()))
        }
    }
}

impl TransferStore for SQLiteTransferStore {
    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Transfer>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, group_id, from_participant_id, to_participant_id, amount, currency
                 FROM transfer WHERE group_id = :group_id ORDER BY id ASC",
            )?
            .query_map(&[(":group_id", &group_id)], SQLiteTransferStore::map_row)?
            .map(|maybe_transfer| maybe_transfer.map_err(|error| error.into()))
            .collect()
    }

    /// Apply `reconciliation` in a single database transaction.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if an update targets a transfer that is not
    /// in the group. Nothing is changed when an error is returned.
    fn apply(
        &self,
        group_id: GroupId,
        reconciliation: Reconciliation<NewTransfer>,
    ) -> Result<Vec<Transfer>, Error> {
        let mut connection = lock(&self.connection)?;
        let transaction = connection.transaction()?;

        for id in &reconciliation.removed {
            transaction.execute(
                "DELETE FROM transfer WHERE id = ?1 AND group_id = ?2",
                (id, group_id),
            )?;
        }

        let transfers = reconciliation
            .rows
            .into_iter()
            .map(|row| apply_row(group_id, row, &transaction))
            .collect::<Result<Vec<Transfer>, Error>>()?;

        transaction.commit()?;

        Ok(transfers)
    }

    fn delete_by_group(&self, group_id: GroupId) -> Result<(), Error> {
        lock(&self.connection)?.execute("DELETE FROM transfer WHERE group_id = ?1", [group_id])?;

        Ok(())
    }
}
