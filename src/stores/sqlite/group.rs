//! Implements a SQLite backed group store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{GroupId, ParticipantId},
    db::{CreateTable, MapRow},
    group::{Group, NewGroup},
    stores::GroupStore,
};

use super::lock;

/// Creates, retrieves and removes groups and their memberships.
#[derive(Debug, Clone)]
pub struct SQLiteGroupStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteGroupStore {
    /// Create a new store from the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteGroupStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS \"group\" (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                admin_id INTEGER NOT NULL,
                currency TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(admin_id) REFERENCES participant(id)
            );

            CREATE TABLE IF NOT EXISTS group_member (
                group_id INTEGER NOT NULL,
                participant_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY(group_id, participant_id),
                FOREIGN KEY(group_id) REFERENCES \"group\"(id) ON DELETE CASCADE,
                FOREIGN KEY(participant_id) REFERENCES participant(id)
            );",
        )?;

        Ok(())
    }
}

/// Maps the group columns. Members are loaded separately by [select_group].
impl MapRow for SQLiteGroupStore {
    type ReturnType = Group;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Group {
            id: row.get(offset)?,
            name: row.get(offset + 1)?,
            admin_id: row.get(offset + 2)?,
            member_ids: Vec::new(),
            currency: row.get(offset + 3)?,
            created_at: row.get(offset + 4)?,
        })
    }
}

fn select_group(id: GroupId, connection: &Connection) -> Result<Group, Error> {
    let mut group = connection
        .prepare(
            "SELECT id, name, admin_id, currency, created_at FROM \"group\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], SQLiteGroupStore::map_row)?;

    group.member_ids = connection
        .prepare(
            "SELECT participant_id FROM group_member WHERE group_id = :id ORDER BY position ASC",
        )?
        .query_map(&[(":id", &id)], |row| row.get(0))?
        .collect::<Result<Vec<ParticipantId>, rusqlite::Error>>()?;

    Ok(group)
}

fn insert_member(
    group_id: GroupId,
    participant_id: ParticipantId,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .execute(
            "INSERT INTO group_member (group_id, participant_id, position)
             VALUES (
                ?1,
                ?2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM group_member WHERE group_id = ?1)
             )",
            (group_id, participant_id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
                },
                _,
            ) => Error::AlreadyAMember(participant_id),
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(())
}

impl GroupStore for SQLiteGroupStore {
    fn create(&self, group: NewGroup) -> Result<Group, Error> {
        let mut connection = lock(&self.connection)?;
        let transaction = connection.transaction()?;

        let group_id: GroupId = transaction
            .execute(
                "INSERT INTO \"group\" (name, admin_id, currency, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                (
                    group.name(),
                    group.admin_id(),
                    group.currency(),
                    OffsetDateTime::now_utc(),
                ),
            )
            .map(|_| transaction.last_insert_rowid())
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                    },
                    _,
                ) => Error::NotFound,
                error => error.into(),
            })?;

        for participant_id in group.member_ids() {
            insert_member(group_id, *participant_id, &transaction)?;
        }

        let created = select_group(group_id, &transaction)?;
        transaction.commit()?;

        Ok(created)
    }

    fn get(&self, id: GroupId) -> Result<Group, Error> {
        let connection = lock(&self.connection)?;

        select_group(id, &connection)
    }

    fn get_by_participant(&self, participant_id: ParticipantId) -> Result<Vec<Group>, Error> {
        let connection = lock(&self.connection)?;

        let group_ids = connection
            .prepare(
                "SELECT \"group\".id FROM \"group\"
                 INNER JOIN group_member ON group_member.group_id = \"group\".id
                 WHERE group_member.participant_id = :participant_id
                 ORDER BY \"group\".created_at ASC, \"group\".id ASC",
            )?
            .query_map(&[(":participant_id", &participant_id)], |row| row.get(0))?
            .collect::<Result<Vec<GroupId>, rusqlite::Error>>()?;

        group_ids
            .into_iter()
            .map(|group_id| select_group(group_id, &connection))
            .collect()
    }

    fn rename(&self, id: GroupId, name: &str) -> Result<Group, Error> {
        let mut connection = lock(&self.connection)?;
        let transaction = connection.transaction()?;

        let rows_affected = transaction.execute(
            "UPDATE \"group\" SET name = ?1 WHERE id = ?2",
            (name, id),
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        let group = select_group(id, &transaction)?;
        transaction.commit()?;

        Ok(group)
    }

    fn add_member(&self, id: GroupId, participant_id: ParticipantId) -> Result<Group, Error> {
        let mut connection = lock(&self.connection)?;
        let transaction = connection.transaction()?;

        // Fail with NotFound before touching the member table.
        select_group(id, &transaction)?;
        insert_member(id, participant_id, &transaction)?;

        let group = select_group(id, &transaction)?;
        transaction.commit()?;

        Ok(group)
    }

    fn remove_member(&self, id: GroupId, participant_id: ParticipantId) -> Result<Group, Error> {
        let mut connection = lock(&self.connection)?;
        let transaction = connection.transaction()?;

        select_group(id, &transaction)?;
        let rows_affected = transaction.execute(
            "DELETE FROM group_member WHERE group_id = ?1 AND participant_id = ?2",
            (id, participant_id),
        )?;

        if rows_affected == 0 {
            return Err(Error::NotAMember(participant_id));
        }

        let group = select_group(id, &transaction)?;
        transaction.commit()?;

        Ok(group)
    }

    // Memberships, expenses, transfers and summaries go with the group through
    // `ON DELETE CASCADE`, all within this one statement.
    fn delete(&self, id: GroupId) -> Result<(), Error> {
        let rows_affected =
            lock(&self.connection)?.execute("DELETE FROM \"group\" WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}
