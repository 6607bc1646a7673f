//! Defines the spend summary store trait.

use crate::{
    Error,
    database_id::GroupId,
    reconcile::Reconciliation,
    summary::{NewSpendSummary, SpendSummary},
};

/// Handles the storage of the per-member spend totals of a group.
pub trait SummaryStore {
    /// Retrieve the current spend summaries for a group.
    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<SpendSummary>, Error>;

    /// Replace the spend summaries for a group with a reconciled generation.
    ///
    /// Implementers must apply the whole reconciliation or nothing. The
    /// summaries are returned in the order of [Reconciliation::rows].
    fn apply(
        &self,
        group_id: GroupId,
        reconciliation: Reconciliation<NewSpendSummary>,
    ) -> Result<Vec<SpendSummary>, Error>;

    /// Remove all spend summaries for a group.
    fn delete_by_group(&self, group_id: GroupId) -> Result<(), Error>;
}
