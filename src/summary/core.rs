//! Core spend summary domain types and the summary builder.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    balance::total_spent_by_member,
    database_id::{DatabaseId, GroupId, ParticipantId},
    expense::Expense,
    reconcile::{NaturalKey, Persisted},
};

/// Database identifier for a spend summary.
pub type SpendSummaryId = DatabaseId;

/// The total a member has spent in a group.
///
/// There is at most one summary per group and member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendSummary {
    /// The ID of the summary.
    pub id: SpendSummaryId,
    /// The group the summary belongs to.
    pub group_id: GroupId,
    /// The member the summary belongs to.
    pub participant_id: ParticipantId,
    /// The member's total spend in the group.
    pub amount: Decimal,
    /// The currency label of the group.
    pub currency: String,
}

/// A computed spend summary that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSpendSummary {
    /// The group the summary belongs to.
    pub group_id: GroupId,
    /// The member the summary belongs to.
    pub participant_id: ParticipantId,
    /// The member's total spend in the group.
    pub amount: Decimal,
    /// The currency label of the group.
    pub currency: String,
}

impl NewSpendSummary {
    /// Attach the ID the store assigned to this summary.
    pub fn with_id(self, id: SpendSummaryId) -> SpendSummary {
        SpendSummary {
            id,
            group_id: self.group_id,
            participant_id: self.participant_id,
            amount: self.amount,
            currency: self.currency,
        }
    }
}

impl NaturalKey for NewSpendSummary {
    type Key = (GroupId, ParticipantId);

    fn natural_key(&self) -> Self::Key {
        (self.group_id, self.participant_id)
    }
}

impl NaturalKey for SpendSummary {
    type Key = (GroupId, ParticipantId);

    fn natural_key(&self) -> Self::Key {
        (self.group_id, self.participant_id)
    }
}

impl Persisted for SpendSummary {
    fn id(&self) -> DatabaseId {
        self.id
    }
}

/// Build one summary per member of `member_ids`, in the same order.
///
/// Members without expenses get a summary with an amount of zero.
pub fn build_spend_summaries(
    group_id: GroupId,
    expenses: &[Expense],
    member_ids: &[ParticipantId],
    currency: &str,
) -> Vec<NewSpendSummary> {
    let spent = total_spent_by_member(expenses, member_ids);

    member_ids
        .iter()
        .map(|participant_id| NewSpendSummary {
            group_id,
            participant_id: *participant_id,
            amount: spent.get(participant_id).copied().unwrap_or_default(),
            currency: currency.to_owned(),
        })
        .collect()
}
