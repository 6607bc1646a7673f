//! Participants: the people who share expenses in groups.

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::ParticipantId};

/// A person who can be a member of groups and record expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The ID of the participant.
    pub id: ParticipantId,
    /// The external identity of the participant, e.g. the `sub` claim of a token.
    pub subject: String,
    /// The display name of the participant.
    pub name: String,
}

/// The data needed to register a [Participant].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    subject: String,
    name: String,
}

impl NewParticipant {
    /// Create a new participant definition.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::EmptySubject] if `subject` is empty or only whitespace,
    /// - or [Error::EmptyParticipantName] if `name` is empty or only whitespace.
    pub fn new(subject: &str, name: &str) -> Result<Self, Error> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(Error::EmptySubject);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyParticipantName);
        }

        Ok(Self {
            subject: subject.to_owned(),
            name: name.to_owned(),
        })
    }

    /// The external identity of the participant.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The display name of the participant.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod new_participant_tests {
    use crate::Error;

    use super::NewParticipant;

    #[test]
    fn new_fails_on_empty_subject() {
        assert_eq!(NewParticipant::new("", "Tom"), Err(Error::EmptySubject));
        assert_eq!(NewParticipant::new("  ", "Tom"), Err(Error::EmptySubject));
    }

    #[test]
    fn new_fails_on_empty_name() {
        assert_eq!(
            NewParticipant::new("auth0|tom", " \t"),
            Err(Error::EmptyParticipantName)
        );
    }

    #[test]
    fn trims_subject_and_name() {
        let participant = NewParticipant::new(" auth0|tom ", " Tom ").unwrap();

        assert_eq!(participant.subject(), "auth0|tom");
        assert_eq!(participant.name(), "Tom");
    }
}
