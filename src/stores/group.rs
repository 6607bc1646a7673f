//! Defines the group store trait.

use crate::{
    Error,
    database_id::{GroupId, ParticipantId},
    group::{Group, NewGroup},
};

/// Handles the creation, retrieval and removal of groups and their members.
pub trait GroupStore {
    /// Create a new group, and its memberships, in the store.
    fn create(&self, group: NewGroup) -> Result<Group, Error>;

    /// Retrieve a group, including its members.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no group with `id`.
    fn get(&self, id: GroupId) -> Result<Group, Error>;

    /// Retrieve every group `participant_id` is a member of, oldest first.
    fn get_by_participant(&self, participant_id: ParticipantId) -> Result<Vec<Group>, Error>;

    /// Change the display name of a group.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no group with `id`.
    fn rename(&self, id: GroupId, name: &str) -> Result<Group, Error>;

    /// Add `participant_id` as the last member of the group.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the group does not exist, or
    /// [Error::AlreadyAMember] if the participant is already a member.
    fn add_member(&self, id: GroupId, participant_id: ParticipantId) -> Result<Group, Error>;

    /// Remove `participant_id` from the members of the group.
    ///
    /// The participant's expenses stay in the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the group does not exist, or
    /// [Error::NotAMember] if the participant is not a member.
    fn remove_member(&self, id: GroupId, participant_id: ParticipantId) -> Result<Group, Error>;

    /// Remove a group from the store, together with its memberships, expenses,
    /// transfers and spend summaries. Either everything is removed or nothing.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no group with `id`.
    fn delete(&self, id: GroupId) -> Result<(), Error>;
}
