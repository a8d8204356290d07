//! Broadcast reentrancy guard
//!
//! One guard per media kind. The lock is recursive so a broadcast that loops
//! back into the same filter on the same thread can reach the in-flight flag
//! instead of deadlocking; the flag is what actually stops the recursion.
//! Other threads block on the lock, which serializes one media kind through
//! the filter.

use std::cell::Cell;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Recursive lock paired with an in-flight flag
#[derive(Default)]
pub struct BroadcastGuard {
    lock: ReentrantMutex<Cell<bool>>,
}

impl BroadcastGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard and mark a broadcast in flight
    ///
    /// Returns `None` if a broadcast of this kind is already in flight on
    /// this thread. The flag is cleared when the returned `InFlight` drops.
    pub fn enter(&self) -> Option<InFlight<'_>> {
        let guard = self.lock.lock();
        if guard.get() {
            return None;
        }
        guard.set(true);
        Some(InFlight { guard })
    }
}

/// A broadcast in progress
///
/// Holds the lock; clears the in-flight flag on every exit path, unwinding
/// included.
pub struct InFlight<'a> {
    guard: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.set(false);
    }
}
