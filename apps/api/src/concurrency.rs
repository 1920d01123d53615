//! Per-user coordination for request handlers.
//!
//! `UserLocks` serializes record creation and saves for one user, so a save can
//! never be issued before the record it targets has been committed. `InFlight`
//! admits at most one generation per user and rejects duplicates outright.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl UserLocks {
    /// Waits for exclusive access to `user_id`'s record.
    pub async fn lock(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody else holds are dropped as we go.
            locks.retain(|id, l| *id == user_id || Arc::strong_count(l) > 1);
            locks.entry(user_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlight {
    /// Claims the slot for `user_id`, or returns `None` if one is already running.
    pub fn try_begin(&self, user_id: Uuid) -> Option<InFlightGuard> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.insert(user_id).then(|| InFlightGuard {
            active: Arc::clone(&self.active),
            user_id,
        })
    }
}

/// Releases the user's slot when dropped.
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<Uuid>>>,
    user_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}
