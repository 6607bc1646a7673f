//! Defines the expense store trait.

use crate::{
    Error,
    database_id::{ExpenseId, GroupId},
    expense::{Expense, NewExpense},
};

/// Handles the creation, retrieval and removal of expenses.
pub trait ExpenseStore {
    /// Create a new expense in the store.
    fn create(&self, expense: NewExpense) -> Result<Expense, Error>;

    /// Retrieve an expense from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no expense with `id`.
    fn get(&self, id: ExpenseId) -> Result<Expense, Error>;

    /// Overwrite the stored expense with the same ID as `expense`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no expense with the ID of `expense`.
    fn update(&self, expense: &Expense) -> Result<Expense, Error>;

    /// Remove an expense from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no expense with `id`.
    fn delete(&self, id: ExpenseId) -> Result<(), Error>;

    /// Retrieve all expenses for a group, oldest first.
    fn get_by_group(&self, group_id: GroupId) -> Result<Vec<Expense>, Error>;
}
