//! Implements a SQLite backed spend summary store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, Transaction};

use crate::{
    Error,
    database_id::GroupId,
    db::{CreateTable, MapRow, get_decimal},
    reconcile::{Reconciled, Reconciliation},
    stores::SummaryStore,
    summary::{NewSpendSummary, SpendSummary},
};

use super::lock;

/// Stores the per-member spend totals of each group.
#[derive(Debug, Clone)]
pub struct SQLiteSummaryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteSummaryStore {
    /// Create a new store from the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteSummaryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS spend_summary (
                id INTEGER PRIMARY KEY,
                group_id INTEGER NOT NULL,
                participant_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                UNIQUE(group_id, participant_id),
                FOREIGN KEY(group_id) REFERENCES \"group\"(id) ON DELETE CASCADE
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteSummaryStore {
    type ReturnType = SpendSummary;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(SpendSummary {
            id: row.get(offset)?,
            group_id: row.get(offset + 1)?,
            participant_id: row.get(offset + 2)?,
            amount: get_decimal(row, offset + 3)?,
            currency: row.get(offset + 4)?,
        })
    }
}

fn apply_row(
    group_id: GroupId,
    row: Reconciled<NewSpendSummary>,
    transaction: &Transaction,
) -> Result<SpendSummary, Error> {
    match row {
        Reconciled::Update { id, row } => {
            let rows_affected = transaction.execute(
                "UPDATE spend_summary SET amount = ?1, currency = ?2
                 WHERE id = ?3 AND group_id = ?4",
                (row.amount.to_string(), &row.currency, id, group_id),
            )?;

            if rows_affected == 0 {
                return Err(Error::NotFound);
            }

            Ok(row.with_id(id))
        }
        Reconciled::Insert(row) => {
            transaction.execute(
                "INSERT INTO spend_summary (group_id, participant_id, amount, currency)
                 VALUES (?1, ?2, ?3, ?4)",
                (
                    group_id,
                    row.participant_id,
                    row.amount.to_string(),
                    &row.currency,
                ),
            )?;

            Ok(row.with_id(transaction.last_insert_rowid()))
        }
    }
}

impl SummaryStore for SQLiteSummaryStore {
    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<SpendSummary>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, group_id, participant_id, amount, currency
                 FROM spend_summary WHERE group_id = :group_id ORDER BY id ASC",
            )?
            .query_map(&[(":group_id", &group_id)], SQLiteSummaryStore::map_row)?
            .map(|maybe_summary| maybe_summary.map_err(|error| error.into()))
            .collect()
    }

    /// Apply `reconciliation` in a single database transaction.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if an update targets a summary that is not
    /// in the group. Nothing is changed when an error is returned.
    fn apply(
        &self,
        group_id: GroupId,
        reconciliation: Reconciliation<NewSpendSummary>,
    ) -> Result<Vec<SpendSummary>, Error> {
        let mut connection = lock(&self.connection)?;
        let transaction = connection.transaction()?;

        for id in &reconciliation.removed {
            transaction.execute(
                "DELETE FROM spend_summary WHERE id = ?1 AND group_id = ?2",
                (id, group_id),
            )?;
        }

        let summaries = reconciliation
            .rows
            .into_iter()
            .map(|row| apply_row(group_id, row, &transaction))
            .collect::<Result<Vec<SpendSummary>, Error>>()?;

        transaction.commit()?;

        Ok(summaries)
    }

    fn delete_by_group(&self, group_id: GroupId) -> Result<(), Error> {
        lock(&self.connection)?
            .execute("DELETE FROM spend_summary WHERE group_id = ?1", [group_id])?;

        Ok(())
    }
}
