//! Matches freshly computed aggregate rows with the rows already in the store.
//!
//! Transfers and spend summaries are derived data that is recomputed after
//! every change to a group's expenses. Matching the new rows with the old
//! ones by a natural key lets a row keep its ID across recomputations, so IDs
//! referenced elsewhere stay valid.

use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use crate::database_id::DatabaseId;

/// A row that can be identified by its content rather than its ID.
pub trait NaturalKey {
    /// The type of the key. Two rows with equal keys describe the same thing.
    type Key: Eq + Hash;

    /// The key identifying this row.
    fn natural_key(&self) -> Self::Key;
}

/// A row that has been saved and given an ID.
pub trait Persisted: NaturalKey {
    /// The ID the store assigned to this row.
    fn id(&self) -> DatabaseId;
}

/// What should happen to one freshly computed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled<N> {
    /// The row replaces the values of the stored row `id`.
    Update {
        /// The ID of the stored row to overwrite.
        id: DatabaseId,
        /// The new values.
        row: N,
    },
    /// The row has no stored counterpart and must be inserted.
    Insert(N),
}

impl<N> Reconciled<N> {
    /// The freshly computed values.
    pub fn row(&self) -> &N {
        match self {
            Reconciled::Update { row, .. } => row,
            Reconciled::Insert(row) => row,
        }
    }
}

/// The changes that turn the stored generation into the fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<N> {
    /// One entry per fresh row, in the order the rows were computed.
    pub rows: Vec<Reconciled<N>>,
    /// The IDs of stored rows that have no fresh counterpart.
    pub removed: Vec<DatabaseId>,
}

impl<N> Reconciliation<N> {
    /// The number of fresh rows that reuse a stored ID.
    pub fn updated_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, Reconciled::Update { .. }))
            .count()
    }

    /// The number of fresh rows that need a new ID.
    pub fn inserted_count(&self) -> usize {
        self.rows.len() - self.updated_count()
    }
}

/// Merge the `fresh` rows with the `existing` rows.
///
/// A fresh row whose natural key matches an existing row takes over the
/// existing row's ID. Fresh rows without a match are inserted and existing
/// rows without a match are removed. Each existing row is matched at most
/// once; if the store holds duplicates for a key, the first one wins and the
/// others are removed.
pub fn reconcile<S, N>(existing: &[S], fresh: Vec<N>) -> Reconciliation<N>
where
    S: Persisted,
    N: NaturalKey<Key = S::Key>,
{
    let mut unmatched: HashMap<S::Key, DatabaseId> = HashMap::with_capacity(existing.len());
    let mut removed = Vec::new();

    for row in existing {
        if let Some(duplicate) = unmatched.insert(row.natural_key(), row.id()) {
            // Keep the first row for the key.
            let kept = unmatched.insert(row.natural_key(), duplicate);
            removed.extend(kept);
        }
    }

    let rows = fresh
        .into_iter()
        .map(|row| match unmatched.remove(&row.natural_key()) {
            Some(id) => Reconciled::Update { id, row },
            None => Reconciled::Insert(row),
        })
        .collect();

    // Removals follow store order.
    let unmatched: HashSet<DatabaseId> = unmatched.into_values().collect();
    removed.extend(
        existing
            .iter()
            .map(|row| row.id())
            .filter(|id| unmatched.contains(id)),
    );

    Reconciliation { rows, removed }
}
