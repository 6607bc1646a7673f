//! Recomputes, removes and reads the spend summaries of a group.

use std::sync::Arc;

use crate::{
    Error,
    database_id::GroupId,
    group_lock::GroupLocks,
    membership::find_member,
    reconcile::reconcile,
    stores::{ExpenseStore, GroupStore, ParticipantStore, SummaryStore},
    summary::{SpendSummary, build_spend_summaries},
};

/// Keeps each group's stored spend summaries in step with its expenses.
#[derive(Debug, Clone)]
pub struct SummaryService<E, G, P, S> {
    expense_store: E,
    group_store: G,
    participant_store: P,
    summary_store: S,
    locks: Arc<GroupLocks>,
}

impl<E, G, P, S> SummaryService<E, G, P, S>
where
    E: ExpenseStore,
    G: GroupStore,
    P: ParticipantStore,
    S: SummaryStore,
{
    /// Create a service that serializes its writes through `locks`.
    pub fn new(
        expense_store: E,
        group_store: G,
        participant_store: P,
        summary_store: S,
        locks: Arc<GroupLocks>,
    ) -> Self {
        Self {
            expense_store,
            group_store,
            participant_store,
            summary_store,
            locks,
        }
    }

    /// Total each member's expenses and store one summary per member.
    ///
    /// A member's summary keeps its ID across recomputations.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the group does not exist, or any error
    /// from the stores. The stored summaries are unchanged on error.
    pub fn recompute_summaries(&self, group_id: GroupId) -> Result<Vec<SpendSummary>, Error> {
        self.locks.with_group(group_id, || {
            let group = self.group_store.get(group_id)?;
            let expenses = self.expense_store.get_by_group(group_id)?;
            let fresh =
                build_spend_summaries(group_id, &expenses, &group.member_ids, &group.currency);

            let existing = self.summary_store.get_by_group(group_id)?;
            let reconciliation = reconcile(&existing, fresh);
            tracing::debug!(
                "group {group_id}: {} summaries updated, {} inserted, {} removed",
                reconciliation.updated_count(),
                reconciliation.inserted_count(),
                reconciliation.removed.len()
            );

            let summaries = self.summary_store.apply(group_id, reconciliation)?;
            tracing::info!(
                "recomputed {} spend summaries for group {group_id}",
                summaries.len()
            );

            Ok(summaries)
        })
    }

    /// Remove all of the group's spend summaries.
    pub fn delete_summaries(&self, group_id: GroupId) -> Result<(), Error> {
        self.locks.with_group(group_id, || {
            self.summary_store.delete_by_group(group_id)?;
            tracing::info!("deleted spend summaries for group {group_id}");

            Ok(())
        })
    }

    /// Get the group's spend summaries on behalf of `subject`.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if `subject` is unknown or not a member,
    /// and [Error::NotFound] if the group does not exist.
    pub fn find_summaries_for_group(
        &self,
        subject: &str,
        group_id: GroupId,
    ) -> Result<Vec<SpendSummary>, Error> {
        find_member(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        self.summary_store.get_by_group(group_id)
    }
}
