//! Named signal bus
//!
//! Every source owns a `SignalHandler`. Signals must be declared before
//! listeners can connect. Emission is synchronous on the caller's thread:
//! the listener list is snapshotted and the bus lock released before any
//! listener runs, so a listener may connect, disconnect, or emit again
//! without deadlocking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::{HostError, Result};
use crate::media::{SourceAudio, VideoFrame};

/// Positional payload of a signal
#[derive(Debug, Clone)]
pub enum CallData {
    /// No payload
    Empty,
    /// A video frame
    Frame(VideoFrame),
    /// A self-describing audio packet
    Audio(SourceAudio),
}

impl CallData {
    /// The frame payload, if any
    pub fn frame(&self) -> Option<&VideoFrame> {
        match self {
            CallData::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    /// The audio payload, if any
    pub fn audio(&self) -> Option<&SourceAudio> {
        match self {
            CallData::Audio(audio) => Some(audio),
            _ => None,
        }
    }
}

/// Callback invoked on emission
pub type Listener = Arc<dyn Fn(&CallData) + Send + Sync>;

/// Handle returned by `connect`, used to disconnect later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-source signal bus
pub struct SignalHandler {
    /// Declared signals and their listeners, in connection order
    signals: RwLock<HashMap<String, Vec<(ListenerId, Listener)>>>,

    next_id: AtomicU64,
}

impl SignalHandler {
    /// Create an empty handler with no declared signals
    pub fn new() -> Self {
        Self {
            signals: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Declare a signal
    ///
    /// Declaring an existing signal keeps its listeners.
    pub fn add_signal(&self, name: &str) {
        self.signals.write().entry(name.to_string()).or_default();
    }

    /// Declare several signals at once
    pub fn add_signals(&self, names: &[&str]) {
        let mut signals = self.signals.write();
        for name in names {
            signals.entry(name.to_string()).or_default();
        }
    }

    /// Whether a signal has been declared
    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.read().contains_key(name)
    }

    /// Connect a listener to a declared signal
    pub fn connect<F>(&self, name: &str, listener: F) -> Result<ListenerId>
    where
        F: Fn(&CallData) + Send + Sync + 'static,
    {
        let mut signals = self.signals.write();
        let listeners = signals
            .get_mut(name)
            .ok_or_else(|| HostError::UnknownSignal(name.to_string()))?;

        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        listeners.push((id, Arc::new(listener)));
        Ok(id)
    }

    /// Disconnect a listener
    ///
    /// Returns false if the listener was not connected to this signal.
    pub fn disconnect(&self, name: &str, id: ListenerId) -> bool {
        let mut signals = self.signals.write();
        match signals.get_mut(name) {
            Some(listeners) => {
                let before = listeners.len();
                listeners.retain(|(listener_id, _)| *listener_id != id);
                listeners.len() != before
            }
            None => false,
        }
    }

    /// Emit a signal to every connected listener
    ///
    /// Returns the number of listeners invoked. Emitting an undeclared
    /// signal is a no-op.
    pub fn emit(&self, name: &str, data: &CallData) -> usize {
        let snapshot: Vec<Listener> = match self.signals.read().get(name) {
            Some(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return 0,
        };

        for listener in &snapshot {
            listener(data);
        }

        snapshot.len()
    }

    /// Number of listeners connected to a signal
    pub fn listener_count(&self, name: &str) -> usize {
        self.signals.read().get(name).map_or(0, Vec::len)
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
