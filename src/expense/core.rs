//! Core expense domain types and validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{ExpenseId, GroupId, ParticipantId},
    group::Group,
};

/// Money one participant spent on behalf of their group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The group the expense is shared with.
    pub group_id: GroupId,
    /// The participant who paid.
    pub participant_id: ParticipantId,
    /// How much was paid.
    pub amount: Decimal,
    /// The currency label, always the same as the group's.
    pub currency: String,
    /// What the money was spent on.
    pub name: String,
    /// When the expense was recorded.
    pub created_at: OffsetDateTime,
}

/// The data needed to record an [Expense].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    /// The group the expense is shared with.
    pub group_id: GroupId,
    /// The participant who paid.
    pub participant_id: ParticipantId,
    /// How much was paid.
    pub amount: Decimal,
    /// The currency label.
    pub currency: String,
    /// What the money was spent on.
    pub name: String,
}

/// Check the fields of an expense against the group it is recorded in.
///
/// # Errors
///
/// This function will return an:
/// - [Error::EmptyExpenseName] if `name` is empty or only whitespace,
/// - [Error::NonPositiveAmount] if `amount` is zero or negative,
/// - [Error::CurrencyMismatch] if `currency` is not the group's currency,
/// - or [Error::NotAMember] if `participant_id` is not a member of `group`.
pub(crate) fn validate_expense(
    name: &str,
    amount: Decimal,
    currency: &str,
    participant_id: ParticipantId,
    group: &Group,
) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyExpenseName);
    }

    if amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount(amount));
    }

    if currency != group.currency {
        return Err(Error::CurrencyMismatch {
            expense: currency.to_owned(),
            group: group.currency.clone(),
        });
    }

    if !group.is_member(participant_id) {
        return Err(Error::NotAMember(participant_id));
    }

    Ok(())
}
