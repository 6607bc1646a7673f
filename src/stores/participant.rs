//! Defines the participant store trait.

use crate::{
    Error,
    database_id::GroupId,
    participant::{NewParticipant, Participant},
};

/// Handles the registration and lookup of participants.
pub trait ParticipantStore {
    /// Register a new participant.
    ///
    /// # Errors
    /// Returns [Error::DuplicateSubject] if the subject is already registered.
    fn create(&self, participant: NewParticipant) -> Result<Participant, Error>;

    /// Find the participant for an external identity.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no participant has the subject.
    fn get_by_subject(&self, subject: &str) -> Result<Participant, Error>;

    /// Get the members of a group in the order they joined.
    ///
    /// A group that does not exist has no members.
    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Participant>, Error>;
}
