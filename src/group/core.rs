//! Core group domain types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{GroupId, ParticipantId},
};

/// A set of participants sharing expenses, with one designated admin.
///
/// Every member takes part in the equal split of the group's expenses,
/// including members that have not recorded any expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// The ID of the group.
    pub id: GroupId,
    /// The display name of the group.
    pub name: String,
    /// The participant allowed to manage the group.
    pub admin_id: ParticipantId,
    /// The members of the group in the order they joined. Contains no duplicates.
    pub member_ids: Vec<ParticipantId>,
    /// The label of the currency the group's expenses are recorded in.
    pub currency: String,
    /// When the group was created.
    pub created_at: OffsetDateTime,
}

impl Group {
    /// Whether `participant_id` is a current member of the group.
    pub fn is_member(&self, participant_id: ParticipantId) -> bool {
        self.member_ids.contains(&participant_id)
    }

    /// Whether `participant_id` is the group's admin.
    pub fn is_admin(&self, participant_id: ParticipantId) -> bool {
        self.admin_id == participant_id
    }
}

/// The data needed to create a [Group].
///
/// The admin is always the first member. Use [NewGroup::member] to add more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    name: String,
    admin_id: ParticipantId,
    currency: String,
    member_ids: Vec<ParticipantId>,
}

impl NewGroup {
    /// Create a new group definition with `admin_id` as its only member.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::EmptyGroupName] if `name` is empty or only whitespace,
    /// - or [Error::EmptyCurrency] if `currency` is empty or only whitespace.
    pub fn new(name: &str, admin_id: ParticipantId, currency: &str) -> Result<Self, Error> {
        let name = validate_group_name(name)?;

        let currency = currency.trim();
        if currency.is_empty() {
            return Err(Error::EmptyCurrency);
        }

        Ok(Self {
            name: name.to_owned(),
            admin_id,
            currency: currency.to_owned(),
            member_ids: vec![admin_id],
        })
    }

    /// Add another member. Adding an existing member has no effect.
    pub fn member(mut self, participant_id: ParticipantId) -> Self {
        if !self.member_ids.contains(&participant_id) {
            self.member_ids.push(participant_id);
        }

        self
    }

    /// The display name of the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The participant that will manage the group.
    pub fn admin_id(&self) -> ParticipantId {
        self.admin_id
    }

    /// The currency label of the group.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// The members of the group, starting with the admin.
    pub fn member_ids(&self) -> &[ParticipantId] {
        &self.member_ids
    }
}

/// Trim `name`, rejecting it with [Error::EmptyGroupName] if nothing is left.
pub(crate) fn validate_group_name(name: &str) -> Result<&str, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyGroupName);
    }

    Ok(name)
}

#[cfg(test)]
mod new_group_tests {
    use crate::Error;

    use super::NewGroup;

    #[test]
    fn new_fails_on_empty_name() {
        assert_eq!(NewGroup::new(" \t", 1, "GBP"), Err(Error::EmptyGroupName));
    }

    #[test]
    fn new_fails_on_empty_currency() {
        assert_eq!(NewGroup::new("Holiday", 1, ""), Err(Error::EmptyCurrency));
    }

    #[test]
    fn admin_is_first_member() {
        let group = NewGroup::new("Holiday", 3, "GBP").unwrap().member(1);

        assert_eq!(group.member_ids(), &[3, 1]);
    }

    #[test]
    fn member_ignores_duplicates() {
        let group = NewGroup::new("Holiday", 3, "GBP")
            .unwrap()
            .member(1)
            .member(3)
            .member(1);

        assert_eq!(group.member_ids(), &[3, 1]);
    }

    #[test]
    fn trims_name_and_currency() {
        let group = NewGroup::new("  Holiday ", 3, " £ ").unwrap();

        assert_eq!(group.name(), "Holiday");
        assert_eq!(group.currency(), "£");
    }
}
