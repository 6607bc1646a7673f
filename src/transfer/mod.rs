//! Payments between members that settle a group's expenses.

mod core;
mod netting;
mod service;

pub use core::{NewTransfer, Transfer, TransferId};
pub use netting::{CURRENCY_SCALE, Settlement, net_debts, quantize_balances};
pub use service::TransferService;
