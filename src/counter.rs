//! Edge-triggered reference counter
//!
//! Showing/active state is reference counted: any number of holders may
//! raise it, and the owner only cares when the count crosses zero. The
//! counter never exposes the raw count; callers get an `Edge` back from the
//! operation that caused the crossing and act on that alone.

use std::sync::atomic::{AtomicU64, Ordering};

/// A zero crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// 0 -> 1
    Rose,
    /// 1 -> 0
    Fell,
}

/// Saturating counter that reports zero crossings
#[derive(Debug, Default)]
pub struct EdgeCounter(AtomicU64);

impl EdgeCounter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Add one reference
    ///
    /// Returns `Some(Edge::Rose)` if this call took the count off zero.
    pub fn increment(&self) -> Option<Edge> {
        match self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
        {
            Ok(0) => Some(Edge::Rose),
            _ => None,
        }
    }

    /// Drop one reference
    ///
    /// Returns `Some(Edge::Fell)` if this call brought the count to zero.
    /// Decrementing at zero is a no-op.
    pub fn decrement(&self) -> Option<Edge> {
        match self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => Some(Edge::Fell),
            _ => None,
        }
    }

    /// Whether at least one reference is held
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire) > 0
    }
}
