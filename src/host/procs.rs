//! Named procedure bus
//!
//! Zero-argument procedures a source exposes to other sources. The relay
//! filter uses it for its lifecycle reference-count endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::{HostError, Result};

/// A registered procedure
pub type Proc = Arc<dyn Fn() + Send + Sync>;

/// Per-source procedure bus
#[derive(Default)]
pub struct ProcHandler {
    procs: RwLock<HashMap<String, Proc>>,
}

impl ProcHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a procedure
    pub fn add<F>(&self, name: &str, proc: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.procs.write().insert(name.to_string(), Arc::new(proc));
    }

    /// Call a procedure by name
    ///
    /// The bus lock is released before the procedure runs.
    pub fn call(&self, name: &str) -> Result<()> {
        let proc = self
            .procs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::UnknownProc(name.to_string()))?;
        proc();
        Ok(())
    }

    /// Whether a procedure is registered
    pub fn has(&self, name: &str) -> bool {
        self.procs.read().contains_key(name)
    }
}
