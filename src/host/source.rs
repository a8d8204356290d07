//! Source objects
//!
//! A `Source` is the host-side context of one input or filter: its identity,
//! name, signal and procedure buses, attached filters, showing/active
//! reference counts and async output queue. The plugin's `SourceImpl` hangs
//! off it and is destroyed when the last strong reference goes away.
//!
//! Sources are shared as `SourceRef` (`Arc<Source>`). Anything that must not
//! keep a source alive holds a `WeakSource` and upgrades it per use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::{Mutex, RwLock};

use super::error::{HostError, Result};
use super::graph::WeakHost;
use super::info::{OutputFlags, SourceImpl, SourceInfo, SourceKind};
use super::output::AsyncOutput;
use super::procs::ProcHandler;
use super::properties::Properties;
use super::settings::Settings;
use super::signal::SignalHandler;
use crate::counter::{Edge, EdgeCounter};
use crate::media::{SourceAudio, VideoFrame};

/// Stable identity of a source, never reused within a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub(crate) u64);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Strong reference to a source
pub type SourceRef = Arc<Source>;

/// Non-owning reference to a source
#[derive(Debug, Clone, Default)]
pub struct WeakSource(Weak<Source>);

impl WeakSource {
    /// Acquire a temporary strong reference, if the source still exists
    pub fn upgrade(&self) -> Option<SourceRef> {
        self.0.upgrade()
    }

    /// Whether the source still exists
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Host-side context of one input or filter
pub struct Source {
    id: SourceId,
    type_id: &'static str,
    kind: SourceKind,
    output_flags: OutputFlags,
    name: RwLock<String>,

    this: Weak<Source>,
    host: WeakHost,

    signals: SignalHandler,
    procs: ProcHandler,

    /// Attached filters (owned), in chain order
    filters: RwLock<Vec<SourceRef>>,
    /// Parent of a filter
    parent: RwLock<Weak<Source>>,

    show_refs: EdgeCounter,
    active_refs: EdgeCounter,
    removed: AtomicBool,

    settings: Mutex<Settings>,
    output: Mutex<AsyncOutput>,

    imp: OnceLock<Arc<dyn SourceImpl>>,
}

impl Source {
    pub(crate) fn new(
        id: SourceId,
        info: &SourceInfo,
        name: &str,
        host: WeakHost,
        settings: Settings,
    ) -> SourceRef {
        Arc::new_cyclic(|this| Source {
            id,
            type_id: info.id,
            kind: info.kind,
            output_flags: info.output_flags,
            name: RwLock::new(name.to_string()),
            this: this.clone(),
            host,
            signals: SignalHandler::new(),
            procs: ProcHandler::new(),
            filters: RwLock::new(Vec::new()),
            parent: RwLock::new(Weak::new()),
            show_refs: EdgeCounter::new(),
            active_refs: EdgeCounter::new(),
            removed: AtomicBool::new(false),
            settings: Mutex::new(settings),
            output: Mutex::new(AsyncOutput::new()),
            imp: OnceLock::new(),
        })
    }

    pub(crate) fn attach_impl(&self, imp: Arc<dyn SourceImpl>) {
        if self.imp.set(imp).is_err() {
            tracing::warn!(source = %self.name(), "Implementation already attached");
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Type id of the descriptor this source was created from
    pub fn type_id(&self) -> &'static str {
        self.type_id
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn output_flags(&self) -> OutputFlags {
        self.output_flags
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub(crate) fn set_name(&self, name: &str) {
        *self.name.write() = name.to_string();
    }

    /// The host this source belongs to
    pub fn host(&self) -> WeakHost {
        self.host.clone()
    }

    /// Non-owning reference to this source
    pub fn downgrade(&self) -> WeakSource {
        WeakSource(self.this.clone())
    }

    pub fn signals(&self) -> &SignalHandler {
        &self.signals
    }

    pub fn procs(&self) -> &ProcHandler {
        &self.procs
    }

    /// Snapshot of the attached filters, in chain order
    pub fn filters(&self) -> Vec<SourceRef> {
        self.filters.read().clone()
    }

    /// Attached filter with the given name
    pub fn find_filter_by_name(&self, name: &str) -> Option<SourceRef> {
        self.filters
            .read()
            .iter()
            .find(|f| *f.name.read() == name)
            .cloned()
    }

    /// Attach a filter to the end of the chain
    pub fn add_filter(&self, filter: SourceRef) -> Result<()> {
        if filter.kind != SourceKind::Filter {
            return Err(HostError::NotAFilter(filter.name()));
        }

        *filter.parent.write() = self.this.clone();

        tracing::debug!(
            source = %self.name(),
            filter = %filter.name(),
            "Filter added"
        );

        self.filters.write().push(filter);
        Ok(())
    }

    /// Detach a filter
    ///
    /// The filter's `filter_remove` runs while it still sees its parent.
    /// Returns false if the filter was not attached here.
    pub fn remove_filter(&self, filter: &SourceRef) -> bool {
        let removed = {
            let mut filters = self.filters.write();
            let before = filters.len();
            filters.retain(|f| f.id != filter.id);
            filters.len() != before
        };

        if !removed {
            return false;
        }

        if let Some(imp) = filter.imp.get() {
            imp.filter_remove(self);
        }
        *filter.parent.write() = Weak::new();

        tracing::debug!(
            source = %self.name(),
            filter = %filter.name(),
            "Filter removed"
        );

        true
    }

    /// Parent of a filter
    pub fn parent(&self) -> Option<SourceRef> {
        self.parent.read().upgrade()
    }

    /// Add a showing reference; calls `show` on the first
    pub fn inc_showing(&self) {
        if self.show_refs.increment() == Some(Edge::Rose) {
            tracing::debug!(source = %self.name(), "Source showing");
            if let Some(imp) = self.imp.get() {
                imp.show();
            }
        }
    }

    /// Drop a showing reference; calls `hide` on the last
    pub fn dec_showing(&self) {
        if self.show_refs.decrement() == Some(Edge::Fell) {
            tracing::debug!(source = %self.name(), "Source hidden");
            if let Some(imp) = self.imp.get() {
                imp.hide();
            }
        }
    }

    /// Add an active reference; calls `activate` on the first
    pub fn inc_active(&self) {
        if self.active_refs.increment() == Some(Edge::Rose) {
            tracing::debug!(source = %self.name(), "Source activated");
            if let Some(imp) = self.imp.get() {
                imp.activate();
            }
        }
    }

    /// Drop an active reference; calls `deactivate` on the last
    pub fn dec_active(&self) {
        if self.active_refs.decrement() == Some(Edge::Fell) {
            tracing::debug!(source = %self.name(), "Source deactivated");
            if let Some(imp) = self.imp.get() {
                imp.deactivate();
            }
        }
    }

    pub fn is_showing(&self) -> bool {
        self.show_refs.is_raised()
    }

    pub fn is_active(&self) -> bool {
        self.active_refs.is_raised()
    }

    /// Whether the source was removed from the graph
    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    /// Mark removed and detach every filter
    pub(crate) fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
        for filter in self.filters() {
            self.remove_filter(&filter);
        }
    }

    /// Submit an async video frame
    ///
    /// The frame runs through the filter chain, then lands in the output
    /// queue. No lock is held while filters run.
    pub fn output_video(&self, frame: VideoFrame) {
        let mut frame = frame;
        for filter in self.filters() {
            match filter.filter_video(frame) {
                Some(next) => frame = next,
                None => return,
            }
        }
        self.output.lock().push_video(frame);
    }

    /// Submit an audio packet
    ///
    /// Filters see the raw planes; the format description is not kept past
    /// the filter chain.
    pub fn output_audio(&self, audio: SourceAudio) {
        let mut raw = audio.to_raw();
        for filter in self.filters() {
            match filter.filter_audio(raw) {
                Some(next) => raw = next,
                None => return,
            }
        }
        self.output.lock().push_audio(raw);
    }

    /// Run this source's implementation as a video filter
    pub fn filter_video(&self, frame: VideoFrame) -> Option<VideoFrame> {
        match self.imp.get() {
            Some(imp) => imp.filter_video(frame),
            None => Some(frame),
        }
    }

    /// Run this source's implementation as an audio filter
    pub fn filter_audio(&self, audio: crate::media::AudioData) -> Option<crate::media::AudioData> {
        match self.imp.get() {
            Some(imp) => imp.filter_audio(audio),
            None => Some(audio),
        }
    }

    /// Draw the source
    pub fn video_render(&self) {
        if let Some(imp) = self.imp.get() {
            imp.video_render();
        }
    }

    /// Tick this source and its filters
    pub(crate) fn video_tick(&self, seconds: f32) {
        if let Some(imp) = self.imp.get() {
            imp.video_tick(seconds);
        }
        for filter in self.filters() {
            filter.video_tick(seconds);
        }
    }

    /// Deliver async output without buffering
    pub fn set_async_unbuffered(&self, unbuffered: bool) {
        self.output.lock().set_unbuffered(unbuffered);
    }

    pub fn async_unbuffered(&self) -> bool {
        self.output.lock().is_unbuffered()
    }

    /// Access the output queue
    pub fn with_output<R>(&self, f: impl FnOnce(&mut AsyncOutput) -> R) -> R {
        f(&mut self.output.lock())
    }

    /// Current settings
    pub fn settings(&self) -> Settings {
        self.settings.lock().clone()
    }

    /// Merge new values into the settings and notify the implementation
    pub fn update(&self, settings: &Settings) {
        let merged = {
            let mut current = self.settings.lock();
            current.apply(settings);
            current.clone()
        };
        if let Some(imp) = self.imp.get() {
            imp.update(&merged);
        }
    }

    /// Property sheet of the implementation
    pub fn properties(&self) -> Properties {
        match self.imp.get() {
            Some(imp) => imp.get_properties(),
            None => Properties::new(),
        }
    }

    /// The implementation, if created
    pub fn imp(&self) -> Option<&dyn SourceImpl> {
        self.imp.get().map(|imp| imp.as_ref())
    }

    /// The implementation as a concrete type
    pub fn imp_as<T: 'static>(&self) -> Option<&T> {
        self.imp.get()?.as_any().downcast_ref::<T>()
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("id", &self.id)
            .field("type_id", &self.type_id)
            .field("kind", &self.kind)
            .field("name", &*self.name.read())
            .finish()
    }
}

impl Drop for Source {
    fn drop(&mut self) {
        if let Some(imp) = self.imp.get() {
            imp.destroy();
        }
        tracing::debug!(source = %self.name.get_mut(), id = %self.id, "Source destroyed");
    }
}
