//! Groups of participants that share expenses.

mod core;
mod service;

pub use core::{Group, NewGroup};
pub use service::GroupService;
