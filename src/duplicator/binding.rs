//! Duplicator binding state
//!
//! Everything a duplicator knows about its target lives in one `Binding`,
//! guarded by one mutex: the configured name, the weakly held filter with
//! its listener handles, the reconciliation countdown, and whether this
//! duplicator is currently shown/active. Keeping them together is what lets
//! rebinding unregister from the old target and register with the new one
//! without a concurrent tick or update seeing a half-done state.

use crate::host::{ListenerId, SourceId, SourceRef, WeakSource};

/// A resolved relay filter this duplicator is subscribed to
#[derive(Debug)]
pub(crate) struct BoundTarget {
    /// Non-owning reference to the filter
    pub weak: WeakSource,
    /// Identity at bind time, compared during reconciliation
    pub id: SourceId,
    pub video: ListenerId,
    pub audio: ListenerId,
}

impl BoundTarget {
    /// Temporary strong reference, if the filter still exists
    pub fn live(&self) -> Option<SourceRef> {
        self.weak.upgrade()
    }
}

/// Target-binding state of one duplicator
#[derive(Debug)]
pub(crate) struct Binding {
    /// Last applied `target_source_name`; `None` before the first update
    pub target_name: Option<String>,
    pub target: Option<BoundTarget>,
    /// Seconds until the next reconciliation check
    pub reconcile_timer: f32,
    /// Whether this duplicator holds a showing reference on its target
    pub shown: bool,
    /// Whether this duplicator holds an active reference on its target
    pub activated: bool,
}

impl Binding {
    pub fn new(interval: f32) -> Self {
        Self {
            target_name: None,
            target: None,
            reconcile_timer: interval,
            shown: false,
            activated: false,
        }
    }

    /// The bound filter, if bound and still alive
    pub fn live_target(&self) -> Option<SourceRef> {
        self.target.as_ref().and_then(BoundTarget::live)
    }

    /// Identity of the bound filter, if it is still alive
    pub fn live_id(&self) -> Option<SourceId> {
        self.target
            .as_ref()
            .filter(|bound| bound.weak.is_alive())
            .map(|bound| bound.id)
    }

    /// Whether a binding exists whose filter has been destroyed
    pub fn is_dangling(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|bound| !bound.weak.is_alive())
    }

    /// Count the timer down; true once it drops below zero
    pub fn countdown(&mut self, seconds: f32) -> bool {
        self.reconcile_timer -= seconds;
        self.reconcile_timer < 0.0
    }

    pub fn rearm(&mut self, interval: f32) {
        self.reconcile_timer = interval;
    }
}
