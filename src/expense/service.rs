//! Records, changes and removes expenses, keeping the group's aggregates current.

use crate::{
    Error,
    database_id::{ExpenseId, GroupId, ParticipantId},
    expense::{Expense, NewExpense, core::validate_expense},
    membership::{find_member, resolve_caller},
    participant::Participant,
    stores::{ExpenseStore, GroupStore, ParticipantStore, SummaryStore, TransferStore},
    summary::SummaryService,
    transfer::TransferService,
};

/// Manages the expenses of groups on behalf of their members.
///
/// Every change recomputes the group's transfers and then its spend
/// summaries before returning.
#[derive(Debug, Clone)]
pub struct ExpenseService<E, G, P, T, S> {
    expense_store: E,
    group_store: G,
    participant_store: P,
    transfer_service: TransferService<E, G, P, T>,
    summary_service: SummaryService<E, G, P, S>,
}

impl<E, G, P, T, S> ExpenseService<E, G, P, T, S>
where
    E: ExpenseStore,
    G: GroupStore,
    P: ParticipantStore,
    T: TransferStore,
    S: SummaryStore,
{
    /// Create a new expense service.
    pub fn new(
        expense_store: E,
        group_store: G,
        participant_store: P,
        transfer_service: TransferService<E, G, P, T>,
        summary_service: SummaryService<E, G, P, S>,
    ) -> Self {
        Self {
            expense_store,
            group_store,
            participant_store,
            transfer_service,
            summary_service,
        }
    }

    /// Record an expense paid by the participant registered for `subject`.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::Unauthorized] if `subject` is unknown or records the expense for someone else,
    /// - [Error::NotFound] if the group does not exist,
    /// - a validation error from the expense checks,
    /// - or any error from the stores.
    pub fn create_expense(&self, subject: &str, expense: NewExpense) -> Result<Expense, Error> {
        let caller = resolve_caller(&self.participant_store, subject)?;
        check_owner(&caller, expense.participant_id)?;

        let group = self.group_store.get(expense.group_id)?;
        validate_expense(
            &expense.name,
            expense.amount,
            &expense.currency,
            expense.participant_id,
            &group,
        )?;

        let created = self.expense_store.create(expense)?;
        tracing::info!(
            "participant {} recorded expense {} of {} {} in group {}",
            caller.id,
            created.id,
            created.amount,
            created.currency,
            created.group_id
        );

        self.recompute(created.group_id)?;

        Ok(created)
    }

    /// Change the name, amount or currency of an expense the caller paid.
    ///
    /// An expense always stays in the group it was recorded in. Any other
    /// `group_id` on `expense` is ignored.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if the caller did not pay for the
    /// expense, [Error::NotFound] if it does not exist, or a validation error.
    pub fn update_expense(&self, subject: &str, expense: Expense) -> Result<Expense, Error> {
        let caller = resolve_caller(&self.participant_store, subject)?;
        let stored = self.expense_store.get(expense.id)?;
        check_owner(&caller, stored.participant_id)?;
        check_owner(&caller, expense.participant_id)?;

        if expense.group_id != stored.group_id {
            tracing::warn!(
                "ignoring attempt to move expense {} from group {} to group {}",
                stored.id,
                stored.group_id,
                expense.group_id
            );
        }

        let expense = Expense {
            group_id: stored.group_id,
            created_at: stored.created_at,
            ..expense
        };

        let group = self.group_store.get(expense.group_id)?;
        validate_expense(
            &expense.name,
            expense.amount,
            &expense.currency,
            expense.participant_id,
            &group,
        )?;

        let updated = self.expense_store.update(&expense)?;
        tracing::info!("participant {} updated expense {}", caller.id, updated.id);

        self.recompute(updated.group_id)?;

        Ok(updated)
    }

    /// Remove an expense the caller paid.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if the caller did not pay for the
    /// expense, or [Error::NotFound] if it does not exist.
    pub fn delete_expense(&self, subject: &str, expense_id: ExpenseId) -> Result<(), Error> {
        let caller = resolve_caller(&self.participant_store, subject)?;
        let stored = self.expense_store.get(expense_id)?;
        check_owner(&caller, stored.participant_id)?;

        self.expense_store.delete(expense_id)?;
        tracing::info!("participant {} deleted expense {expense_id}", caller.id);

        self.recompute(stored.group_id)
    }

    /// Get every expense of a group on behalf of one of its members.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] if `subject` is unknown or not a member,
    /// and [Error::NotFound] if the group does not exist.
    pub fn find_expenses_for_group(
        &self,
        subject: &str,
        group_id: GroupId,
    ) -> Result<Vec<Expense>, Error> {
        find_member(
            &self.group_store,
            &self.participant_store,
            subject,
            group_id,
        )?;

        self.expense_store.get_by_group(group_id)
    }

    fn recompute(&self, group_id: GroupId) -> Result<(), Error> {
        self.transfer_service.recompute_transfers(group_id)?;
        self.summary_service.recompute_summaries(group_id)?;

        Ok(())
    }
}

fn check_owner(caller: &Participant, payer_id: ParticipantId) -> Result<(), Error> {
    if caller.id != payer_id {
        tracing::debug!(
            "participant {} cannot act on an expense paid by {payer_id}",
            caller.id
        );
        return Err(Error::Unauthorized);
    }

    Ok(())
}

#[cfg(test)]
mod expense_service_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        expense::{Expense, NewExpense},
        group::Group,
        group_lock::GroupLocks,
        participant::Participant,
        stores::{
            SummaryStore, TransferStore,
            sqlite::{
                SQLiteExpenseStore, SQLiteGroupStore, SQLiteParticipantStore,
                SQLiteSummaryStore, SQLiteTransferStore,
                test_utils::{create_test_group, create_test_participants, get_test_connection},
            },
        },
        summary::SummaryService,
        transfer::TransferService,
    };

    use super::ExpenseService;

    type TestService = ExpenseService<
        SQLiteExpenseStore,
        SQLiteGroupStore,
        SQLiteParticipantStore,
        SQLiteTransferStore,
        SQLiteSummaryStore,
    >;

    fn get_test_service() -> (TestService, Group, Vec<Participant>, Arc<Mutex<Connection>>) {
        let connection = get_test_connection();
        let participants = create_test_participants(&connection, &["a", "b", "outsider"]);
        let group = create_test_group(&connection, &[&participants[0], &participants[1]]);

        let expense_store = SQLiteExpenseStore::new(connection.clone());
        let group_store = SQLiteGroupStore::new(connection.clone());
        let participant_store = SQLiteParticipantStore::new(connection.clone());
        let locks = Arc::new(GroupLocks::new());

        let service = ExpenseService::new(
            expense_store.clone(),
            group_store.clone(),
            participant_store.clone(),
            TransferService::new(
                expense_store.clone(),
                group_store.clone(),
                participant_store.clone(),
                SQLiteTransferStore::new(connection.clone()),
                locks.clone(),
            ),
            SummaryService::new(
                expense_store,
                group_store,
                participant_store,
                SQLiteSummaryStore::new(connection.clone()),
                locks,
            ),
        );

        (service, group, participants, connection)
    }

    fn new_expense(group: &Group, participant: &Participant, amount: Decimal) -> NewExpense {
        NewExpense {
            group_id: group.id,
            participant_id: participant.id,
            amount,
            currency: "£".to_owned(),
            name: "Groceries".to_owned(),
        }
    }

    #[test]
    fn create_expense_recomputes_aggregates() {
        let (service, group, participants, connection) = get_test_service();

        service
            .create_expense("a", new_expense(&group, &participants[0], dec!(56)))
            .unwrap();
        service
            .create_expense("b", new_expense(&group, &participants[1], dec!(1)))
            .unwrap();

        let transfers = SQLiteTransferStore::new(connection.clone())
            .get_by_group(group.id)
            .unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from_participant_id, participants[1].id);
        assert_eq!(transfers[0].to_participant_id, participants[0].id);
        assert_eq!(transfers[0].amount, dec!(27.5));

        let summaries = SQLiteSummaryStore::new(connection)
            .get_by_group(group.id)
            .unwrap();
        let amounts: Vec<Decimal> = summaries.iter().map(|summary| summary.amount).collect();
        assert_eq!(amounts, vec![dec!(56), dec!(1)]);
    }

    #[test]
    fn create_expense_for_someone_else_is_unauthorized() {
        let (service, group, participants, _) = get_test_service();

        let got = service.create_expense("a", new_expense(&group, &participants[1], dec!(5)));

        assert_eq!(got, Err(Error::Unauthorized));
    }

    #[test]
    fn create_expense_as_unknown_subject_is_unauthorized() {
        let (service, group, participants, _) = get_test_service();

        let got = service.create_expense("nobody", new_expense(&group, &participants[0], dec!(5)));

        assert_eq!(got, Err(Error::Unauthorized));
    }

    #[test]
    fn create_expense_as_outsider_fails() {
        let (service, group, participants, _) = get_test_service();

        let got = service.create_expense(
            "outsider",
            new_expense(&group, &participants[2], dec!(5)),
        );

        assert_eq!(got, Err(Error::NotAMember(participants[2].id)));
    }

    #[test]
    fn create_expense_validates_fields() {
        let (service, group, participants, _) = get_test_service();
        let mut expense = new_expense(&group, &participants[0], dec!(0));

        assert_eq!(
            service.create_expense("a", expense.clone()),
            Err(Error::NonPositiveAmount(dec!(0)))
        );

        expense.amount = dec!(5);
        expense.currency = "NZD".to_owned();
        assert_eq!(
            service.create_expense("a", expense.clone()),
            Err(Error::CurrencyMismatch {
                expense: "NZD".to_owned(),
                group: "£".to_owned(),
            })
        );

        expense.currency = "£".to_owned();
        expense.name = "  ".to_owned();
        assert_eq!(
            service.create_expense("a", expense),
            Err(Error::EmptyExpenseName)
        );
    }

    #[test]
    fn create_expense_fails_on_missing_group() {
        let (service, group, participants, _) = get_test_service();
        let mut expense = new_expense(&group, &participants[0], dec!(5));
        expense.group_id = group.id + 1;

        assert_eq!(service.create_expense("a", expense), Err(Error::NotFound));
    }

    #[test]
    fn update_expense_keeps_transfer_id() {
        let (service, group, participants, connection) = get_test_service();
        service
            .create_expense("a", new_expense(&group, &participants[0], dec!(56)))
            .unwrap();
        let expense = service
            .create_expense("b", new_expense(&group, &participants[1], dec!(1)))
            .unwrap();
        let transfer_store = SQLiteTransferStore::new(connection);
        let before = transfer_store.get_by_group(group.id).unwrap();

        let updated = service
            .update_expense(
                "b",
                Expense {
                    amount: dec!(11),
                    ..expense
                },
            )
            .unwrap();

        let after = transfer_store.get_by_group(group.id).unwrap();
        assert_eq!(updated.amount, dec!(11));
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, before[0].id);
        assert_eq!(after[0].amount, dec!(22.5));
    }

    #[test]
    fn update_expense_cannot_move_groups() {
        let (service, group, participants, _) = get_test_service();
        let expense = service
            .create_expense("a", new_expense(&group, &participants[0], dec!(5)))
            .unwrap();

        let got = service
            .update_expense(
                "a",
                Expense {
                    group_id: group.id + 1,
                    name: "Rent".to_owned(),
                    ..expense
                },
            )
            .unwrap();

        assert_eq!(got.group_id, group.id);
        assert_eq!(got.name, "Rent");
    }

    #[test]
    fn update_expense_by_other_member_is_unauthorized() {
        let (service, group, participants, _) = get_test_service();
        let expense = service
            .create_expense("a", new_expense(&group, &participants[0], dec!(5)))
            .unwrap();

        let got = service.update_expense("b", expense.clone());
        let reassigned = service.update_expense(
            "a",
            Expense {
                participant_id: participants[1].id,
                ..expense
            },
        );

        assert_eq!(got, Err(Error::Unauthorized));
        assert_eq!(reassigned, Err(Error::Unauthorized));
    }

    #[test]
    fn update_expense_validates_amount() {
        let (service, group, participants, _) = get_test_service();
        let expense = service
            .create_expense("a", new_expense(&group, &participants[0], dec!(5)))
            .unwrap();

        let got = service.update_expense(
            "a",
            Expense {
                amount: dec!(-1),
                ..expense
            },
        );

        assert_eq!(got, Err(Error::NonPositiveAmount(dec!(-1))));
    }

    #[test]
    fn delete_expense_recomputes_aggregates() {
        let (service, group, participants, connection) = get_test_service();
        let expense = service
            .create_expense("a", new_expense(&group, &participants[0], dec!(56)))
            .unwrap();

        service.delete_expense("a", expense.id).unwrap();

        assert_eq!(service.find_expenses_for_group("a", group.id), Ok(vec![]));
        assert_eq!(
            SQLiteTransferStore::new(connection).get_by_group(group.id),
            Ok(vec![])
        );
    }

    #[test]
    fn delete_expense_by_other_member_is_unauthorized() {
        let (service, group, participants, _) = get_test_service();
        let expense = service
            .create_expense("a", new_expense(&group, &participants[0], dec!(56)))
            .unwrap();

        assert_eq!(
            service.delete_expense("b", expense.id),
            Err(Error::Unauthorized)
        );
    }

    #[test]
    fn delete_fails_on_missing_expense() {
        let (service, _, _, _) = get_test_service();

        assert_eq!(service.delete_expense("a", 404), Err(Error::NotFound));
    }

    #[test]
    fn members_can_find_expenses() {
        let (service, group, participants, _) = get_test_service();
        let want = vec![
            service
                .create_expense("a", new_expense(&group, &participants[0], dec!(56)))
                .unwrap(),
            service
                .create_expense("b", new_expense(&group, &participants[1], dec!(1)))
                .unwrap(),
        ];

        assert_eq!(service.find_expenses_for_group("b", group.id), Ok(want));
        assert_eq!(
            service.find_expenses_for_group("outsider", group.id),
            Err(Error::Unauthorized)
        );
    }
}
