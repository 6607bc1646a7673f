//! Resolves callers to participants and checks what they may access.

use crate::{
    Error,
    database_id::GroupId,
    group::Group,
    participant::Participant,
    stores::{GroupStore, ParticipantStore},
};

/// Find the participant registered for `subject`.
///
/// # Errors
/// Returns [Error::Unauthorized] if no participant has the subject.
pub(crate) fn resolve_caller<P: ParticipantStore>(
    participant_store: &P,
    subject: &str,
) -> Result<Participant, Error> {
    participant_store
        .get_by_subject(subject)
        .map_err(|error| match error {
            Error::NotFound => {
                tracing::debug!("no participant is registered for subject \"{subject}\"");
                Error::Unauthorized
            }
            error => error,
        })
}

/// Load a group on behalf of `subject`, who must be one of its members.
///
/// # Errors
///
/// This function will return an:
/// - [Error::Unauthorized] if the subject is unknown or not a member,
/// - [Error::NotFound] if the group does not exist,
/// - or any error from the stores.
pub(crate) fn find_member<G: GroupStore, P: ParticipantStore>(
    group_store: &G,
    participant_store: &P,
    subject: &str,
    group_id: GroupId,
) -> Result<(Participant, Group), Error> {
    let caller = resolve_caller(participant_store, subject)?;
    let group = group_store.get(group_id)?;

    if !group.is_member(caller.id) {
        tracing::debug!(
            "participant {} is not a member of group {group_id}",
            caller.id
        );
        return Err(Error::Unauthorized);
    }

    Ok((caller, group))
}

/// Load a group on behalf of `subject`, who must be its admin.
///
/// # Errors
/// Same as [find_member], with [Error::Unauthorized] also returned for members
/// that are not the admin.
pub(crate) fn find_admin<G: GroupStore, P: ParticipantStore>(
    group_store: &G,
    participant_store: &P,
    subject: &str,
    group_id: GroupId,
) -> Result<(Participant, Group), Error> {
    let caller = resolve_caller(participant_store, subject)?;
    let group = group_store.get(group_id)?;

    if !group.is_admin(caller.id) {
        tracing::debug!("participant {} is not the admin of group {group_id}", caller.id);
        return Err(Error::Unauthorized);
    }

    Ok((caller, group))
}
