//! Creates, changes, reads and removes groups.

use std::sync::Arc;

use crate::{
    Error,
    database_id::{GroupId, ParticipantId},
    group::{Group, NewGroup, core::validate_group_name},
    group_lock::GroupLocks,
    membership::{find_admin, find_member, resolve_caller},
    participant::Participant,
    stores::{ExpenseStore, GroupStore, ParticipantStore, SummaryStore, TransferStore},
    summary::SummaryService,
    transfer::TransferService,
};

/// Manages groups and their membership.
#[derive(Debug, Clone)]
pub struct GroupService<E, G, P, T, S> {
    group_store: G,
    participant_store: P,
    transfer_service: TransferService<E, G, P, T>,
    summary_service: SummaryService<E, G, P, S>,
    locks: Arc<GroupLocks>,
}

impl<E, G, P, T, S> GroupService<E, G, P, T, S>
where
    E: ExpenseStore,
    G: GroupStore,
    P: ParticipantStore,
    T: TransferStore,
    S: SummaryStore,
{
    /// Create a new group service.
    pub fn new(
        group_store: G,
        participant_store: P,
        transfer_service: TransferService<E, G, P, T>,
        summary_service: SummaryService<E, G, P, S>,
        locks: Arc<GroupLocks>,
    ) -> Self {
        Self {
            group_store,
            participant_store,
            transfer_service,
            summary_service,
            locks,
        }
    }

    /// Create a group administered by the participant registered for
    /// `subject`, and compute its (empty) aggregates.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::Unauthorized] if `subject` is unknown or is not the group's admin,
    /// - [Error::NotFound] if a member is not a registered participant,
    /// - or any error from the stores.
    pub fn create_group(&self, subject: &str, group: NewGroup) -> Result<Group, Error> {
        let caller = resolve_caller(&self.participant_store, subject)?;
        if caller.id != group.admin_id() {
            tracing::debug!(
                "participant {} cannot create a group administered by {}",
                caller.id,
                group.admin_id()
            );
            return Err(Error::Unauthorized);
        }

        let group = self.group_store.create(group)?;
        tracing::info!(
            "participant {} created group {} with {} members",
            group.admin_id,
            group.id,
            group.member_ids.len()
        );

        self.recompute(group.id)?;

        Ok(group)
    }

    /// Get every group the participant registered for `subject` belongs to.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if `subject` is unknown.
    pub fn find_groups_for_subject(&self, subject: &str) -> Result<Vec<Group>, Error> {
        let caller = resolve_caller(&self.participant_store, subject)?;

        self.group_store.get_by_participant(caller.id)
    }

    /// Get a group on behalf of one of its members.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if `subject` is unknown or not a member,
    /// and [Error::NotFound] if the group does not exist.
    pub fn find_group(&self, subject: &str, group_id: GroupId) -> Result<Group, Error> {
        let (_, group) = find_member(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        Ok(group)
    }

    /// Get the members of a group, in joining order, on behalf of one of them.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if `subject` is unknown or not a member,
    /// and [Error::NotFound] if the group does not exist.
    pub fn find_members(
        &self,
        subject: &str,
        group_id: GroupId,
    ) -> Result<Vec<Participant>, Error> {
        find_member(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        self.participant_store.get_by_group(group_id)
    }

    /// Give a group administered by `subject` a new name.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::Unauthorized] if `subject` is not the group's admin,
    /// - [Error::NotFound] if the group does not exist,
    /// - [Error::EmptyGroupName] if `name` is empty or only whitespace,
    /// - or any error from the stores.
    pub fn rename_group(
        &self,
        subject: &str,
        group_id: GroupId,
        name: &str,
    ) -> Result<Group, Error> {
        find_admin(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;
        let name = validate_group_name(name)?;

        let group = self.group_store.rename(group_id, name)?;
        tracing::info!("renamed group {group_id} to \"{}\"", group.name);

        Ok(group)
    }

    /// Add `participant_id` to a group administered by `subject`.
    ///
    /// The new member joins the equal split, so the group's aggregates are
    /// recomputed.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::Unauthorized] if `subject` is not the group's admin,
    /// - [Error::NotFound] if the group or participant does not exist,
    /// - [Error::AlreadyAMember] if the participant is already a member,
    /// - or any error from the stores.
    pub fn add_member(
        &self,
        subject: &str,
        group_id: GroupId,
        participant_id: ParticipantId,
    ) -> Result<Group, Error> {
        find_admin(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        let group = self.group_store.add_member(group_id, participant_id)?;
        tracing::info!("participant {participant_id} joined group {group_id}");

        self.recompute(group_id)?;

        Ok(group)
    }

    /// Remove `participant_id` from a group administered by `subject`.
    ///
    /// The removed member leaves the equal split and loses their spend
    /// summary. Their expenses stay stored but no longer count towards the
    /// group's totals.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::Unauthorized] if `subject` is not the group's admin,
    /// - [Error::NotFound] if the group does not exist,
    /// - [Error::CannotRemoveAdmin] if `participant_id` is the admin,
    /// - [Error::NotAMember] if the participant is not a member,
    /// - or any error from the stores.
    pub fn remove_member(
        &self,
        subject: &str,
        group_id: GroupId,
        participant_id: ParticipantId,
    ) -> Result<Group, Error> {
        let (_, group) = find_admin(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        if group.is_admin(participant_id) {
            return Err(Error::CannotRemoveAdmin(participant_id));
        }

        let group = self.group_store.remove_member(group_id, participant_id)?;
        tracing::info!("participant {participant_id} left group {group_id}");

        self.recompute(group_id)?;

        Ok(group)
    }

    /// Remove a group administered by `subject`, along with its expenses and
    /// aggregates.
    ///
    /// The group and everything that belongs to it are removed in one step,
    /// so a failure leaves the group as it was.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if `subject` is not the group's admin and
    /// [Error::NotFound] if the group does not exist.
    pub fn delete_group(&self, subject: &str, group_id: GroupId) -> Result<(), Error> {
        find_admin(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        self.locks.with_group(group_id, || self.group_store.delete(group_id))?;
        self.locks.remove(group_id)?;

        tracing::info!("deleted group {group_id}");

        Ok(())
    }

    fn recompute(&self, group_id: GroupId) -> Result<(), Error> {
        self.transfer_service.recompute_transfers(group_id)?;
        self.summary_service.recompute_summaries(group_id)?;

        Ok(())
    }
}
