//! Host source graph
//!
//! The `Host` owns the registered source types, the name index of input
//! sources, the main render callbacks and the global audio format. Cloning
//! a `Host` is cheap; every clone refers to the same graph.
//!
//! ```text
//!                      Host (Arc<HostInner>)
//!            ┌───────────────────────────────────────┐
//!            │ types:   id -> SourceInfo             │
//!            │ sources: name -> SourceRef            │
//!            │ render_callbacks, audio_info          │
//!            └──────────────────┬────────────────────┘
//!                               │
//!             ┌─────────────────┼─────────────────┐
//!             ▼                 ▼                 ▼
//!         [Source A]        [Source B]        [Source C]
//!          filters: [F]      filters: []       filters: [...]
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::config::HostConfig;
use super::error::{HostError, Result};
use super::info::{SourceInfo, SourceKind};
use super::settings::Settings;
use super::source::{Source, SourceId, SourceRef};
use crate::media::AudioOutputInfo;

/// Main render callback, called with the base canvas size
pub type RenderCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// Handle to remove a render callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

struct HostInner {
    config: HostConfig,

    /// Registered source types by id
    types: RwLock<HashMap<&'static str, SourceInfo>>,

    /// Input sources by name
    sources: RwLock<HashMap<String, SourceRef>>,

    render_callbacks: RwLock<Vec<(CallbackId, RenderCallback)>>,

    /// Global audio output format, `None` until audio is initialized
    audio_info: RwLock<Option<AudioOutputInfo>>,

    next_source_id: AtomicU64,
    next_callback_id: AtomicU64,
}

/// Handle to the host graph
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

/// Non-owning handle to the host graph
#[derive(Clone, Default)]
pub struct WeakHost(Weak<HostInner>);

impl WeakHost {
    pub fn upgrade(&self) -> Option<Host> {
        self.0.upgrade().map(|inner| Host { inner })
    }
}

impl std::fmt::Debug for WeakHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakHost")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

impl Host {
    /// Create a host with default configuration
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    /// Create a host with custom configuration
    pub fn with_config(config: HostConfig) -> Self {
        Self {
            inner: Arc::new(HostInner {
                config,
                types: RwLock::new(HashMap::new()),
                sources: RwLock::new(HashMap::new()),
                render_callbacks: RwLock::new(Vec::new()),
                audio_info: RwLock::new(None),
                next_source_id: AtomicU64::new(1),
                next_callback_id: AtomicU64::new(1),
            }),
        }
    }

    /// Get the host configuration
    pub fn config(&self) -> &HostConfig {
        &self.inner.config
    }

    pub fn downgrade(&self) -> WeakHost {
        WeakHost(Arc::downgrade(&self.inner))
    }

    /// Register a source type
    ///
    /// Registering an id twice replaces the earlier descriptor.
    pub fn register_source_type(&self, info: SourceInfo) {
        tracing::info!(id = info.id, kind = ?info.kind, "Source type registered");
        self.inner.types.write().insert(info.id, info);
    }

    /// Descriptor of a registered type
    pub fn source_type(&self, id: &str) -> Option<SourceInfo> {
        self.inner.types.read().get(id).cloned()
    }

    fn instantiate(&self, info: &SourceInfo, name: &str, settings: &Settings) -> SourceRef {
        let mut merged = Settings::new();
        if let Some(get_defaults) = info.get_defaults {
            get_defaults(&mut merged);
        }
        merged.apply(settings);

        let id = SourceId(self.inner.next_source_id.fetch_add(1, Ordering::Relaxed));
        let source = Source::new(id, info, name, self.downgrade(), merged.clone());
        let imp = (info.create)(&merged, &source);
        source.attach_impl(imp);
        source
    }

    /// Create an input source and add it to the graph
    pub fn create_source(&self, type_id: &str, name: &str, settings: &Settings) -> Result<SourceRef> {
        let info = self
            .source_type(type_id)
            .ok_or_else(|| HostError::UnknownSourceType(type_id.to_string()))?;
        if info.kind != SourceKind::Input {
            return Err(HostError::NotAnInput(type_id.to_string()));
        }
        if self.inner.sources.read().contains_key(name) {
            return Err(HostError::DuplicateName(name.to_string()));
        }

        // Created outside the index lock: `create` may look up other sources
        let source = self.instantiate(&info, name, settings);

        {
            let mut sources = self.inner.sources.write();
            if sources.contains_key(name) {
                drop(sources);
                return Err(HostError::DuplicateName(name.to_string()));
            }
            sources.insert(name.to_string(), Arc::clone(&source));
        }

        tracing::info!(source = %name, type_id = %type_id, id = %source.id(), "Source created");
        Ok(source)
    }

    /// Create a filter, not yet attached to any source
    pub fn create_filter(&self, type_id: &str, name: &str, settings: &Settings) -> Result<SourceRef> {
        let info = self
            .source_type(type_id)
            .ok_or_else(|| HostError::UnknownSourceType(type_id.to_string()))?;
        if info.kind != SourceKind::Filter {
            return Err(HostError::NotAFilter(name.to_string()));
        }

        let filter = self.instantiate(&info, name, settings);
        tracing::info!(filter = %name, type_id = %type_id, id = %filter.id(), "Filter created");
        Ok(filter)
    }

    /// Look up an input source by name
    pub fn get_source_by_name(&self, name: &str) -> Option<SourceRef> {
        self.inner.sources.read().get(name).cloned()
    }

    /// Snapshot of all input sources
    pub fn sources(&self) -> Vec<SourceRef> {
        self.inner.sources.read().values().cloned().collect()
    }

    /// Rename an input source
    pub fn rename_source(&self, old: &str, new: &str) -> Result<()> {
        let mut sources = self.inner.sources.write();
        if sources.contains_key(new) {
            return Err(HostError::DuplicateName(new.to_string()));
        }
        let source = sources
            .remove(old)
            .ok_or_else(|| HostError::SourceNotFound(old.to_string()))?;
        source.set_name(new);
        sources.insert(new.to_string(), source);

        tracing::info!(old = %old, new = %new, "Source renamed");
        Ok(())
    }

    /// Remove an input source from the graph
    ///
    /// Filters are detached immediately. The source itself is destroyed once
    /// the last outstanding strong reference is released.
    pub fn remove_source(&self, name: &str) -> Result<()> {
        let source = self
            .inner
            .sources
            .write()
            .remove(name)
            .ok_or_else(|| HostError::SourceNotFound(name.to_string()))?;

        source.mark_removed();
        tracing::info!(source = %name, id = %source.id(), "Source removed");
        Ok(())
    }

    /// Register a main render callback
    pub fn add_main_render_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(u32, u32) + Send + Sync + 'static,
    {
        let id = CallbackId(self.inner.next_callback_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .render_callbacks
            .write()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a main render callback
    pub fn remove_main_render_callback(&self, id: CallbackId) -> bool {
        let mut callbacks = self.inner.render_callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|(cb_id, _)| *cb_id != id);
        callbacks.len() != before
    }

    /// Number of registered main render callbacks
    pub fn render_callback_count(&self) -> usize {
        self.inner.render_callbacks.read().len()
    }

    /// Run one main render pass
    pub fn render_main(&self) {
        let (cx, cy) = (self.inner.config.canvas_width, self.inner.config.canvas_height);
        let snapshot: Vec<RenderCallback> = self
            .inner
            .render_callbacks
            .read()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in snapshot {
            callback(cx, cy);
        }
    }

    /// Tick every input source and its filters
    pub fn tick(&self, seconds: f32) {
        for source in self.sources() {
            source.video_tick(seconds);
        }
    }

    /// Global audio output format
    pub fn audio_output_info(&self) -> Option<AudioOutputInfo> {
        *self.inner.audio_info.read()
    }

    /// Initialize or replace the global audio output format
    pub fn reset_audio(&self, info: AudioOutputInfo) {
        *self.inner.audio_info.write() = Some(info);
        tracing::info!(
            samples_per_sec = info.samples_per_sec,
            channels = info.speakers.channels(),
            "Audio output reset"
        );
    }

    /// Tear down the global audio output
    pub fn shutdown_audio(&self) {
        *self.inner.audio_info.write() = None;
    }

    /// Spawn the frame loop
    ///
    /// Every `frame_interval` the loop ticks all sources with the elapsed
    /// time and then runs the main render callbacks. Returns a handle that
    /// can be used to abort the task.
    pub fn spawn_frame_loop(&self) -> tokio::task::JoinHandle<()> {
        let host = self.clone();
        let interval = host.inner.config.frame_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last = tokio::time::Instant::now();
            loop {
                ticker.tick().await;
                let now = tokio::time::Instant::now();
                let seconds = now.duration_since(last).as_secs_f32();
                last = now;

                host.tick(seconds);
                host.render_main();
            }
        })
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("sources", &self.inner.sources.read().len())
            .field("types", &self.inner.types.read().len())
            .finish()
    }
}
