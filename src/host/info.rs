//! Source type descriptors
//!
//! A `SourceInfo` is what a plugin registers with the host: a fixed type id,
//! whether it is an input or a filter, what it outputs, and how to create
//! its implementation. The implementation is a `SourceImpl`, whose methods are
//! the host's lifecycle callbacks. Every callback has a no-op default.

use std::any::Any;
use std::sync::Arc;

use bitflags::bitflags;

use super::properties::Properties;
use super::settings::Settings;
use super::source::{Source, SourceRef};
use crate::media::{AudioData, VideoFrame};

/// Input source or filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Standalone node in the graph, looked up by name
    Input,
    /// Attached to exactly one parent source
    Filter,
}

bitflags! {
    /// What a source type produces
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputFlags: u32 {
        const VIDEO = 1 << 0;
        const AUDIO = 1 << 1;
        const ASYNC = 1 << 2;
        const ASYNC_VIDEO = Self::ASYNC.bits() | Self::VIDEO.bits();
    }
}

/// Lifecycle callbacks of a source implementation
///
/// Called by the host from its render, audio, tick and UI threads, possibly
/// concurrently on one instance.
pub trait SourceImpl: Send + Sync {
    /// Settings changed
    fn update(&self, _settings: &Settings) {}

    /// Last strong reference to the source is gone
    fn destroy(&self) {}

    /// Periodic tick with seconds since the previous one
    fn video_tick(&self, _seconds: f32) {}

    /// Draw the source's current image
    fn video_render(&self) {}

    /// Became part of a visible rendering path
    fn show(&self) {}

    /// No longer part of any visible rendering path
    fn hide(&self) {}

    /// Became part of the live output mix
    fn activate(&self) {}

    /// Left the live output mix
    fn deactivate(&self) {}

    /// Describe the property sheet
    fn get_properties(&self) -> Properties {
        Properties::new()
    }

    /// Filter an async video frame; `None` drops it
    fn filter_video(&self, frame: VideoFrame) -> Option<VideoFrame> {
        Some(frame)
    }

    /// Filter raw audio; `None` drops it
    fn filter_audio(&self, audio: AudioData) -> Option<AudioData> {
        Some(audio)
    }

    /// Filter is being detached from `parent`
    fn filter_remove(&self, _parent: &Source) {}

    /// Downcast support
    fn as_any(&self) -> &dyn Any;
}

/// Factory for a source implementation
pub type CreateFn = Arc<dyn Fn(&Settings, &SourceRef) -> Arc<dyn SourceImpl> + Send + Sync>;

/// A registered source type
#[derive(Clone)]
pub struct SourceInfo {
    /// Fixed type id
    pub id: &'static str,
    /// Input or filter
    pub kind: SourceKind,
    /// What the type produces
    pub output_flags: OutputFlags,
    /// Name shown to users
    pub display_name: String,
    /// Fills in default settings before `create`
    pub get_defaults: Option<fn(&mut Settings)>,
    /// Creates the implementation for a new source
    pub create: CreateFn,
}

impl SourceInfo {
    /// Describe a source type
    pub fn new<F>(id: &'static str, kind: SourceKind, output_flags: OutputFlags, create: F) -> Self
    where
        F: Fn(&Settings, &SourceRef) -> Arc<dyn SourceImpl> + Send + Sync + 'static,
    {
        Self {
            id,
            kind,
            output_flags,
            display_name: id.to_string(),
            get_defaults: None,
            create: Arc::new(create),
        }
    }

    /// Set the user-facing name
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the defaults hook
    pub fn defaults(mut self, get_defaults: fn(&mut Settings)) -> Self {
        self.get_defaults = Some(get_defaults);
        self
    }
}

impl std::fmt::Debug for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInfo")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("output_flags", &self.output_flags)
            .field("display_name", &self.display_name)
            .finish()
    }
}
