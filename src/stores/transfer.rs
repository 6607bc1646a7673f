//! Defines the transfer store trait.

use crate::{
    Error,
    database_id::GroupId,
    reconcile::Reconciliation,
    transfer::{NewTransfer, Transfer},
};

/// Handles the storage of the transfers that settle a group.
pub trait TransferStore {
    /// Retrieve the current transfers for a group.
    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Transfer>, Error>;

    /// Replace the transfers for a group with a reconciled generation.
    ///
    /// Implementers must apply the whole reconciliation or nothing, so that
    /// the previous transfers are kept if an error occurs. The transfers are
    /// returned in the order of [Reconciliation::rows].
    fn apply(
        &self,
        group_id: GroupId,
        reconciliation: Reconciliation<NewTransfer>,
    ) -> Result<Vec<Transfer>, Error>;

    /// Remove all transfers for a group.
    fn delete_by_group(&self, group_id: GroupId) -> Result<(), Error>;
}
