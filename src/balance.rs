//! Works out how far each member of a group is from paying an equal share.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::ParticipantId, expense::Expense};

/// A member's position relative to an equal split of the group's spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The member this balance belongs to.
    pub participant_id: ParticipantId,
    /// How much the member has spent in total.
    pub total_spent: Decimal,
    /// The equal share minus what the member spent.
    ///
    /// Positive values mean the member underpaid and owes money into the
    /// pool, negative values mean the member overpaid and is owed money.
    pub net_owed: Decimal,
}

/// Calculate each member's balance for an equal split of `expenses`.
///
/// Every member in `member_ids` takes part in the split, including members
/// without any expenses. Expenses paid by participants that are not in
/// `member_ids` are left out of the total so that the balances still sum to
/// zero. Balances are returned in the order of `member_ids`.
///
/// The equal share is not rounded, see [crate::quantize_balances] for
/// rounding to currency precision.
///
/// # Errors
/// Returns [Error::EmptyGroup] if `member_ids` is empty.
pub fn calculate_balances(
    expenses: &[Expense],
    member_ids: &[ParticipantId],
) -> Result<Vec<Balance>, Error> {
    if member_ids.is_empty() {
        return Err(Error::EmptyGroup);
    }

    let spent = total_spent_by_member(expenses, member_ids);
    let total: Decimal = spent.values().copied().sum();
    let equal_share = total / Decimal::from(member_ids.len());

    tracing::debug!(
        "splitting {total} between {} members, equal share is {equal_share}",
        member_ids.len()
    );

    let balances = member_ids
        .iter()
        .map(|participant_id| {
            let total_spent = spent.get(participant_id).copied().unwrap_or_default();

            Balance {
                participant_id: *participant_id,
                total_spent,
                net_owed: equal_share - total_spent,
            }
        })
        .collect();

    Ok(balances)
}

/// Sum the expenses of each member. Members without expenses map to zero.
pub(crate) fn total_spent_by_member(
    expenses: &[Expense],
    member_ids: &[ParticipantId],
) -> HashMap<ParticipantId, Decimal> {
    let mut spent: HashMap<ParticipantId, Decimal> = member_ids
        .iter()
        .map(|participant_id| (*participant_id, Decimal::ZERO))
        .collect();

    for expense in expenses {
        match spent.get_mut(&expense.participant_id) {
            Some(total) => *total += expense.amount,
            None => tracing::warn!(
                "ignoring expense {} from participant {} who is not a member of group {}",
                expense.id,
                expense.participant_id,
                expense.group_id
            ),
        }
    }

    spent
}
