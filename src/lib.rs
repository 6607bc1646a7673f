//! Dutch is a service for splitting shared group expenses.
//!
//! This library provides the settlement engine: it works out how much each
//! member of a group has spent, how far each member is from an equal share of
//! the group's spending, and the payments ("who pays whom") that settle the
//! group. The derived transfers and spend summaries are stored alongside the
//! expenses and recomputed every time a group's expenses change.

#![warn(missing_docs)]

mod app_state;
mod balance;
mod database_id;
mod db;
mod expense;
mod group;
mod group_lock;
mod logging;
mod membership;
mod participant;
mod reconcile;
mod summary;
mod transfer;

pub mod stores;

pub use app_state::AppState;
pub use balance::{Balance, calculate_balances};
pub use database_id::{DatabaseId, ExpenseId, GroupId, ParticipantId};
pub use db::initialize as initialize_db;
pub use expense::{Expense, ExpenseService, NewExpense};
pub use group::{Group, GroupService, NewGroup};
pub use group_lock::GroupLocks;
pub use logging::setup_logging;
pub use participant::{NewParticipant, Participant};
pub use reconcile::{NaturalKey, Persisted, Reconciled, Reconciliation, reconcile};
pub use summary::{
    NewSpendSummary, SpendSummary, SpendSummaryId, SummaryService, build_spend_summaries,
};
pub use transfer::{
    CURRENCY_SCALE, NewTransfer, Settlement, Transfer, TransferId, TransferService, net_debts,
    quantize_balances,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The caller is not allowed to see or change the requested group.
    ///
    /// Reads of a group's aggregates are restricted to current members, and
    /// changes to the group itself are restricted to the group's admin.
    #[error("the caller is not authorized to access this group")]
    Unauthorized,

    /// A group without any members reached the balance calculator.
    ///
    /// Groups always contain their admin, so this indicates a broken invariant
    /// upstream rather than bad user input.
    #[error("cannot split expenses in a group with no members")]
    EmptyGroup,

    /// An expense was given an empty name.
    #[error("expense name cannot be empty")]
    EmptyExpenseName,

    /// A group was given an empty name.
    #[error("group name cannot be empty")]
    EmptyGroupName,

    /// A participant was registered with an empty subject.
    #[error("participant subject cannot be empty")]
    EmptySubject,

    /// A participant was registered with an empty display name.
    #[error("participant name cannot be empty")]
    EmptyParticipantName,

    /// A group was given an empty currency label.
    #[error("group currency cannot be empty")]
    EmptyCurrency,

    /// An expense amount was zero or negative.
    #[error("expense amount must be greater than zero, got {0}")]
    NonPositiveAmount(rust_decimal::Decimal),

    /// The currency of an expense differs from the currency of its group.
    ///
    /// Currencies are opaque labels and are never converted.
    #[error("expense currency \"{expense}\" does not match the group currency \"{group}\"")]
    CurrencyMismatch {
        /// The currency on the expense.
        expense: String,
        /// The currency of the group.
        group: String,
    },

    /// The participant is not a member of the group.
    #[error("participant {0} is not a member of the group")]
    NotAMember(ParticipantId),

    /// The participant is already a member of the group.
    #[error("participant {0} is already a member of the group")]
    AlreadyAMember(ParticipantId),

    /// The admin of a group was removed from its members.
    ///
    /// The admin is always a member of the group they manage.
    #[error("participant {0} is the admin and cannot leave the group")]
    CannotRemoveAdmin(ParticipantId),

    /// The subject is already registered to another participant.
    #[error("the subject \"{0}\" is already registered")]
    DuplicateSubject(String),

    /// Could not acquire a lock, either on the database or on a group.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
