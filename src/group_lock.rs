//! Per-group locks that serialize recomputation of a group's aggregates.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{Error, database_id::GroupId};

/// Hands out one lock per group.
///
/// Recomputing a group's transfers or summaries reads the group's expenses,
/// computes the new aggregates and writes them back. Two of these running at
/// the same time for the same group could interleave and persist a stale
/// generation, so services hold the group's lock for the whole sequence.
/// Different groups never contend with each other.
#[derive(Debug, Default)]
pub struct GroupLocks {
    locks: Mutex<HashMap<GroupId, Arc<Mutex<()>>>>,
}

impl GroupLocks {
    /// Create an empty set of locks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for `group_id`, creating it on first use.
    ///
    /// Callers lock the returned mutex and keep the guard alive for as long
    /// as they need exclusive access to the group.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the lock table was poisoned.
    pub fn get(&self, group_id: GroupId) -> Result<Arc<Mutex<()>>, Error> {
        let mut locks = self.locks.lock().map_err(|_| Error::DatabaseLockError)?;

        Ok(locks.entry(group_id).or_default().clone())
    }

    /// Run `f` while holding the lock for `group_id`.
    ///
    /// The lock is not reentrant: `f` must not call back into anything that
    /// locks the same group.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the lock was poisoned, otherwise
    /// whatever `f` returns.
    pub fn with_group<T>(
        &self,
        group_id: GroupId,
        f: impl FnOnce() -> Result<T, Error>,
    ) -> Result<T, Error> {
        let lock = self.get(group_id)?;
        let _guard = lock.lock().map_err(|_| Error::DatabaseLockError)?;

        f()
    }

    /// Forget the lock for a deleted group.
    pub fn remove(&self, group_id: GroupId) -> Result<(), Error> {
        self.locks
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .remove(&group_id);

        Ok(())
    }
}
