//! Implements a struct that wires the stores into the settlement services.

use std::sync::Arc;

use crate::{
    expense::ExpenseService,
    group::GroupService,
    group_lock::GroupLocks,
    stores::{ExpenseStore, GroupStore, ParticipantStore, SummaryStore, TransferStore},
    summary::SummaryService,
    transfer::TransferService,
};

/// The services of the application, all sharing one set of stores and one
/// set of group locks.
#[derive(Debug, Clone)]
pub struct AppState<E, G, P, T, S> {
    /// Records and changes expenses.
    pub expense_service: ExpenseService<E, G, P, T, S>,

    /// Creates and manages groups.
    pub group_service: GroupService<E, G, P, T, S>,

    /// Recomputes and reads the transfers that settle groups.
    pub transfer_service: TransferService<E, G, P, T>,

    /// Recomputes and reads the per-member spend totals of groups.
    pub summary_service: SummaryService<E, G, P, S>,

    /// Registers participants.
    pub participant_store: P,
}

impl<E, G, P, T, S> AppState<E, G, P, T, S>
where
    E: ExpenseStore + Clone,
    G: GroupStore + Clone,
    P: ParticipantStore + Clone,
    T: TransferStore + Clone,
    S: SummaryStore + Clone,
{
    /// Create a new [AppState] from the stores.
    pub fn new(
        expense_store: E,
        group_store: G,
        participant_store: P,
        transfer_store: T,
        summary_store: S,
    ) -> Self {
        let locks = Arc::new(GroupLocks::new());

        let transfer_service = TransferService::new(
            expense_store.clone(),
            group_store.clone(),
            participant_store.clone(),
            transfer_store,
            locks.clone(),
        );
        let summary_service = SummaryService::new(
            expense_store.clone(),
            group_store.clone(),
            participant_store.clone(),
            summary_store,
            locks.clone(),
        );

        Self {
            expense_service: ExpenseService::new(
                expense_store,
                group_store.clone(),
                participant_store.clone(),
                transfer_service.clone(),
                summary_service.clone(),
            ),
            group_service: GroupService::new(
                group_store,
                participant_store.clone(),
                transfer_service.clone(),
                summary_service.clone(),
                locks,
            ),
            transfer_service,
            summary_service,
            participant_store,
        }
    }
}
