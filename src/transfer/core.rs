//! Core transfer domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    database_id::{DatabaseId, GroupId, ParticipantId},
    reconcile::{NaturalKey, Persisted},
};

/// Database identifier for a transfer.
pub type TransferId = DatabaseId;

/// One payment from a member who underpaid to a member who overpaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The ID of the transfer.
    pub id: TransferId,
    /// The group the transfer settles.
    pub group_id: GroupId,
    /// The member who pays.
    pub from_participant_id: ParticipantId,
    /// The member who is paid.
    pub to_participant_id: ParticipantId,
    /// How much is paid. Always positive.
    pub amount: Decimal,
    /// The currency label of the group.
    pub currency: String,
}

/// A computed transfer that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransfer {
    /// The group the transfer settles.
    pub group_id: GroupId,
    /// The member who pays.
    pub from_participant_id: ParticipantId,
    /// The member who is paid.
    pub to_participant_id: ParticipantId,
    /// How much is paid. Always positive.
    pub amount: Decimal,
    /// The currency label of the group.
    pub currency: String,
}

impl NewTransfer {
    /// Attach the ID the store assigned to this transfer.
    pub fn with_id(self, id: TransferId) -> Transfer {
        Transfer {
            id,
            group_id: self.group_id,
            from_participant_id: self.from_participant_id,
            to_participant_id: self.to_participant_id,
            amount: self.amount,
            currency: self.currency,
        }
    }
}

/// Transfers are identified by who pays whom within a group.
impl NaturalKey for NewTransfer {
    type Key = (GroupId, ParticipantId, ParticipantId);

    fn natural_key(&self) -> Self::Key {
        (
            self.group_id,
            self.from_participant_id,
            self.to_participant_id,
        )
    }
}

impl NaturalKey for Transfer {
    type Key = (GroupId, ParticipantId, ParticipantId);

    fn natural_key(&self) -> Self::Key {
        (
            self.group_id,
            self.from_participant_id,
            self.to_participant_id,
        )
    }
}

impl Persisted for Transfer {
    fn id(&self) -> DatabaseId {
        self.id
    }
}
