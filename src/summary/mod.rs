//! Per-member totals of how much each member has spent in a group.

mod core;
mod service;

pub use core::{NewSpendSummary, SpendSummary, SpendSummaryId, build_spend_summaries};
pub use service::SummaryService;
