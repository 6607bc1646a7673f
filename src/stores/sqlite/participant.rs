//! Implements a SQLite backed participant store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::GroupId,
    db::{CreateTable, MapRow},
    participant::{NewParticipant, Participant},
    stores::ParticipantStore,
};

use super::lock;

/// Registers participants and looks them up by their external identity.
#[derive(Debug, Clone)]
pub struct SQLiteParticipantStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteParticipantStore {
    /// Create a new store from the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteParticipantStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS participant (
                id INTEGER PRIMARY KEY,
                subject TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteParticipantStore {
    type ReturnType = Participant;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Participant {
            id: row.get(offset)?,
            subject: row.get(offset + 1)?,
            name: row.get(offset + 2)?,
        })
    }
}

impl ParticipantStore for SQLiteParticipantStore {
    fn create(&self, participant: NewParticipant) -> Result<Participant, Error> {
        lock(&self.connection)?
            .prepare(
                "INSERT INTO participant (subject, name) VALUES (?1, ?2)
                 RETURNING id, subject, name",
            )?
            .query_row(
                (participant.subject(), participant.name()),
                SQLiteParticipantStore::map_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                    },
                    _,
                ) => Error::DuplicateSubject(participant.subject().to_owned()),
                error => error.into(),
            })
    }

    fn get_by_subject(&self, subject: &str) -> Result<Participant, Error> {
        lock(&self.connection)?
            .prepare("SELECT id, subject, name FROM participant WHERE subject = :subject")?
            .query_row(&[(":subject", subject)], SQLiteParticipantStore::map_row)
            .map_err(|error| error.into())
    }

    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Participant>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT participant.id, participant.subject, participant.name
                 FROM participant
                 INNER JOIN group_member ON group_member.participant_id = participant.id
                 WHERE group_member.group_id = :group_id
                 ORDER BY group_member.position ASC",
            )?
            .query_map(&[(":group_id", &group_id)], SQLiteParticipantStore::map_row)?
            .map(|maybe_participant| maybe_participant.map_err(Error::from))
            .collect()
    }
}
