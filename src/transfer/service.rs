//! Recomputes, removes and reads the transfers that settle a group.

use std::sync::Arc;

use crate::{
    Error,
    balance::calculate_balances,
    database_id::GroupId,
    group_lock::GroupLocks,
    membership::find_member,
    reconcile::reconcile,
    stores::{ExpenseStore, GroupStore, ParticipantStore, TransferStore},
    transfer::{NewTransfer, Transfer, net_debts},
};

/// Keeps each group's stored transfers in step with its expenses.
#[derive(Debug, Clone)]
pub struct TransferService<E, G, P, T> {
    expense_store: E,
    group_store: G,
    participant_store: P,
    transfer_store: T,
    locks: Arc<GroupLocks>,
}

impl<E, G, P, T> TransferService<E, G, P, T>
where
    E: ExpenseStore,
    G: GroupStore,
    P: ParticipantStore,
    T: TransferStore,
{
    /// Create a service that serializes its writes through `locks`.
    pub fn new(
        expense_store: E,
        group_store: G,
        participant_store: P,
        transfer_store: T,
        locks: Arc<GroupLocks>,
    ) -> Self {
        Self {
            expense_store,
            group_store,
            participant_store,
            transfer_store,
            locks,
        }
    }

    /// Work out the transfers that settle the group and store them.
    ///
    /// Transfers that still exist between the same two members keep their ID
    /// and take the new amount. Transfers that are no longer needed are
    /// removed.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the group does not exist, or any error
    /// from the stores. The stored transfers are unchanged on error.
    pub fn recompute_transfers(&self, group_id: GroupId) -> Result<Vec<Transfer>, Error> {
        self.locks.with_group(group_id, || {
            let group = self.group_store.get(group_id)?;
            let expenses = self.expense_store.get_by_group(group_id)?;
            let balances = calculate_balances(&expenses, &group.member_ids)?;

            let fresh: Vec<NewTransfer> = net_debts(&balances)
                .into_iter()
                .map(|settlement| NewTransfer {
                    group_id,
                    from_participant_id: settlement.from,
                    to_participant_id: settlement.to,
                    amount: settlement.amount,
                    currency: group.currency.clone(),
                })
                .collect();

            let existing = self.transfer_store.get_by_group(group_id)?;
            let reconciliation = reconcile(&existing, fresh);
            tracing::debug!(
                "group {group_id}: {} transfers updated, {} inserted, {} removed",
                reconciliation.updated_count(),
                reconciliation.inserted_count(),
                reconciliation.removed.len()
            );

            let transfers = self.transfer_store.apply(group_id, reconciliation)?;
            tracing::info!(
                "recomputed {} transfers for group {group_id}",
                transfers.len()
            );

            Ok(transfers)
        })
    }

    /// Remove all of the group's transfers.
    pub fn delete_transfers(&self, group_id: GroupId) -> Result<(), Error> {
        self.locks.with_group(group_id, || {
            self.transfer_store.delete_by_group(group_id)?;
            tracing::info!("deleted transfers for group {group_id}");

            Ok(())
        })
    }

    /// Get the group's transfers on behalf of `subject`.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::Unauthorized] if `subject` is unknown or not a member of the group,
    /// - [Error::NotFound] if the group does not exist,
    /// - or any error from the stores.
    pub fn find_transfers_for_group(
        &self,
        subject: &str,
        group_id: GroupId,
    ) -> Result<Vec<Transfer>, Error> {
        find_member(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        self.transfer_store.get_by_group(group_id)
    }
}

#[cfg(test)]
mod transfer_service_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        database_id::GroupId,
        group::Group,
        group_lock::GroupLocks,
        participant::Participant,
        reconcile::Reconciliation,
        stores::{
            TransferStore,
            sqlite::{
                SQLiteExpenseStore, SQLiteGroupStore, SQLiteParticipantStore,
                SQLiteTransferStore,
                test_utils::{
                    create_test_expense, create_test_group, create_test_participants,
                    get_test_connection,
                },
            },
        },
        transfer::{NewTransfer, Transfer},
    };

    use super::TransferService;

    type TestService<T = SQLiteTransferStore> =
        TransferService<SQLiteExpenseStore, SQLiteGroupStore, SQLiteParticipantStore, T>;

    fn new_service<T: TransferStore>(
        connection: &Arc<Mutex<Connection>>,
        transfer_store: T,
    ) -> TestService<T> {
        TransferService::new(
            SQLiteExpenseStore::new(connection.clone()),
            SQLiteGroupStore::new(connection.clone()),
            SQLiteParticipantStore::new(connection.clone()),
            transfer_store,
            Arc::new(GroupLocks::new()),
        )
    }

    /// Registers "a", "b", "c" and "outsider" and groups the first `member_count`.
    fn get_test_service(
        member_count: usize,
    ) -> (TestService, Group, Vec<Participant>, Arc<Mutex<Connection>>) {
        let connection = get_test_connection();
        let participants = create_test_participants(&connection, &["a", "b", "c", "outsider"]);
        let members: Vec<&Participant> = participants.iter().take(member_count).collect();
        let group = create_test_group(&connection, &members);
        let service = new_service(&connection, SQLiteTransferStore::new(connection.clone()));

        (service, group, participants, connection)
    }

    fn summarize(transfers: &[Transfer]) -> Vec<(i64, i64, rust_decimal::Decimal)> {
        transfers
            .iter()
            .map(|transfer| {
                (
                    transfer.from_participant_id,
                    transfer.to_participant_id,
                    transfer.amount,
                )
            })
            .collect()
    }

    #[test]
    fn splits_two_member_group_equally() {
        let (service, group, participants, connection) = get_test_service(2);
        let [a, b, ..] = &participants[..] else {
            panic!("expected participants");
        };
        create_test_expense(&connection, &group, a.id, dec!(56));
        create_test_expense(&connection, &group, b.id, dec!(1));

        let got = service.recompute_transfers(group.id).unwrap();

        assert_eq!(summarize(&got), vec![(b.id, a.id, dec!(27.5))]);
        assert_eq!(got[0].currency, "£");
        assert_eq!(got[0].group_id, group.id);
    }

    #[test]
    fn update_keeps_transfer_id() {
        let (service, group, participants, connection) = get_test_service(2);
        let [a, b, ..] = &participants[..] else {
            panic!("expected participants");
        };
        create_test_expense(&connection, &group, a.id, dec!(56));
        create_test_expense(&connection, &group, b.id, dec!(1));
        let first = service.recompute_transfers(group.id).unwrap();

        create_test_expense(&connection, &group, b.id, dec!(10));
        let got = service.recompute_transfers(group.id).unwrap();

        assert_eq!(summarize(&got), vec![(b.id, a.id, dec!(22.5))]);
        assert_eq!(got[0].id, first[0].id);
    }

    #[test]
    fn one_creditor_is_paid_by_every_debtor() {
        let (service, group, participants, connection) = get_test_service(3);
        let [a, b, c, ..] = &participants[..] else {
            panic!("expected participants");
        };
        create_test_expense(&connection, &group, a.id, dec!(90));

        let got = service.recompute_transfers(group.id).unwrap();

        assert_eq!(
            summarize(&got),
            vec![(b.id, a.id, dec!(30)), (c.id, a.id, dec!(30))]
        );
    }

    #[test]
    fn recompute_is_idempotent() {
        let (service, group, participants, connection) = get_test_service(3);
        create_test_expense(&connection, &group, participants[0].id, dec!(10));

        let first = service.recompute_transfers(group.id).unwrap();
        let second = service.recompute_transfers(group.id).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn group_without_expenses_has_no_transfers() {
        let (service, group, _, _) = get_test_service(3);

        assert_eq!(service.recompute_transfers(group.id), Ok(vec![]));
    }

    #[test]
    fn settled_group_loses_old_transfers() {
        let (service, group, participants, connection) = get_test_service(2);
        create_test_expense(&connection, &group, participants[0].id, dec!(10));
        service.recompute_transfers(group.id).unwrap();

        create_test_expense(&connection, &group, participants[1].id, dec!(10));
        let got = service.recompute_transfers(group.id).unwrap();

        assert_eq!(got, vec![]);
        assert_eq!(
            SQLiteTransferStore::new(connection).get_by_group(group.id),
            Ok(vec![])
        );
    }

    #[test]
    fn recompute_fails_on_missing_group() {
        let (service, group, _, _) = get_test_service(2);

        assert_eq!(
            service.recompute_transfers(group.id + 1),
            Err(Error::NotFound)
        );
    }

    /// Reads from SQLite but refuses to write.
    #[derive(Debug, Clone)]
    struct ReadOnlyTransferStore(SQLiteTransferStore);

    impl TransferStore for ReadOnlyTransferStore {
        fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Transfer>, Error> {
            self.0.get_by_group(group_id)
        }

        fn apply(
            &self,
            _group_id: GroupId,
            _reconciliation: Reconciliation<NewTransfer>,
        ) -> Result<Vec<Transfer>, Error> {
            Err(Error::DatabaseLockError)
        }

        fn delete_by_group(&self, _group_id: GroupId) -> Result<(), Error> {
            Err(Error::DatabaseLockError)
        }
    }

    #[test]
    fn failed_write_keeps_previous_transfers() {
        let (service, group, participants, connection) = get_test_service(2);
        create_test_expense(&connection, &group, participants[0].id, dec!(56));
        let want = service.recompute_transfers(group.id).unwrap();
        let failing_service = new_service(
            &connection,
            ReadOnlyTransferStore(SQLiteTransferStore::new(connection.clone())),
        );

        create_test_expense(&connection, &group, participants[1].id, dec!(10));
        let got = failing_service.recompute_transfers(group.id);

        assert_eq!(got, Err(Error::DatabaseLockError));
        assert_eq!(
            SQLiteTransferStore::new(connection).get_by_group(group.id),
            Ok(want)
        );
    }

    #[test]
    fn delete_transfers_removes_everything() {
        let (service, group, participants, connection) = get_test_service(2);
        create_test_expense(&connection, &group, participants[0].id, dec!(56));
        service.recompute_transfers(group.id).unwrap();

        service.delete_transfers(group.id).unwrap();

        assert_eq!(service.find_transfers_for_group("a", group.id), Ok(vec![]));
    }

    #[test]
    fn member_can_find_transfers() {
        let (service, group, participants, connection) = get_test_service(2);
        create_test_expense(&connection, &group, participants[0].id, dec!(56));
        let want = service.recompute_transfers(group.id).unwrap();

        let got = service.find_transfers_for_group("b", group.id);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn outsider_cannot_find_transfers() {
        let (service, group, _, _) = get_test_service(2);

        let got = service.find_transfers_for_group("outsider", group.id);

        assert_eq!(got, Err(Error::Unauthorized));
    }

    #[test]
    fn unknown_subject_cannot_find_transfers() {
        let (service, group, _, _) = get_test_service(2);

        let got = service.find_transfers_for_group("nobody", group.id);

        assert_eq!(got, Err(Error::Unauthorized));
    }

    #[test]
    fn find_fails_on_missing_group() {
        let (service, group, _, _) = get_test_service(2);

        let got = service.find_transfers_for_group("a", group.id + 1);

        assert_eq!(got, Err(Error::NotFound));
    }
}
