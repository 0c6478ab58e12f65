//! Per-identity mutual exclusion.
//!
//! Two firing notifications for the same alert group that arrive together can both
//! list the tracker before either has created the issue, and both would create one.
//! [`IdentityLocks`] closes that window inside one process by letting only one
//! reconciliation per identity run at a time. It does not coordinate between
//! processes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// A set of async locks keyed by issue identity.
#[derive(Debug, Clone, Default)]
pub struct IdentityLocks {
    locks: Arc<Mutex<LockMap>>,
}

/// Holds the lock for one identity until dropped.
#[derive(Debug)]
pub struct IdentityGuard {
    // Declared first so the lock is released before the registration checks for idleness.
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}

/// One holder's or waiter's claim on a map entry.
///
/// Dropping it removes the entry once nobody else holds or waits on it, including
/// when a waiter is cancelled before it gets the lock.
#[derive(Debug)]
struct Registration {
    identity: String,
    locks: Arc<Mutex<LockMap>>,
    lock: Arc<AsyncMutex<()>>,
}

impl IdentityLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder has `identity`, then takes it.
    pub async fn acquire(&self, identity: &str) -> IdentityGuard {
        let registration = {
            let mut locks = lock_map(&self.locks);
            let lock = locks
                .entry(identity.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone();
            Registration {
                identity: identity.to_string(),
                locks: self.locks.clone(),
                lock,
            }
        };

        let guard = registration.lock.clone().lock_owned().await;
        IdentityGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of identities currently held or waited on.
    #[must_use]
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    /// Returns true if no identity is held or waited on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut locks = lock_map(&self.locks);

        // The map's reference plus our own means nobody else holds or waits.
        let idle = locks.get(&self.identity).is_some_and(|lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) <= 2
        });
        if idle {
            locks.remove(&self.identity);
        }
    }
}

fn lock_map(locks: &Mutex<LockMap>) -> MutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_identity_is_serialized() {
        let locks = IdentityLocks::new();
        let first = locks.acquire("[g] DiskFull").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("[g] DiskFull").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_identities_do_not_block() {
        let locks = IdentityLocks::new();
        let _disk = locks.acquire("[g] DiskFull").await;

        let node = tokio::time::timeout(Duration::from_secs(1), locks.acquire("[g] NodeDown")).await;
        assert!(node.is_ok());
    }

    #[tokio::test]
    async fn abandoned_waiters_are_forgotten() {
        let locks = IdentityLocks::new();
        let held = locks.acquire("[g] DiskFull").await;

        let mut waiting = Box::pin(locks.acquire("[g] DiskFull"));
        let timed_out = tokio::time::timeout(Duration::from_millis(20), &mut waiting).await;
        assert!(timed_out.is_err());

        // The holder leaves while the waiter is still queued, then the waiter gives up.
        drop(held);
        assert_eq!(locks.len(), 1);
        drop(waiting);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn abandoned_waiter_keeps_entry_for_holder() {
        let locks = IdentityLocks::new();
        let held = locks.acquire("[g] DiskFull").await;

        let waiting =
            tokio::time::timeout(Duration::from_millis(20), locks.acquire("[g] DiskFull")).await;
        assert!(waiting.is_err());
        assert_eq!(locks.len(), 1);

        drop(held);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn released_identities_are_forgotten() {
        let locks = IdentityLocks::new();
        {
            let _guard = locks.acquire("[g] DiskFull").await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }
}
