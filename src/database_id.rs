//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a group of participants that share expenses.
pub type GroupId = DatabaseId;

/// The ID of a person taking part in one or more groups.
pub type ParticipantId = DatabaseId;

/// The ID of a single expense recorded against a group.
pub type ExpenseId = DatabaseId;
