//! Expenses recorded against groups.

mod core;
mod service;

pub use core::{Expense, NewExpense};
pub use service::ExpenseService;
