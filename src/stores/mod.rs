//! Contains traits and implementations for objects that store the domain models.
//!
//! The settlement services only talk to storage through these traits, so
//! they can be backed by SQLite in the application and by fakes in tests.

mod expense;
mod group;
mod participant;
mod summary;
mod transfer;

pub mod sqlite;

pub use expense::ExpenseStore;
pub use group::GroupStore;
pub use participant::ParticipantStore;
pub use summary::SummaryStore;
pub use transfer::TransferStore;
