//! In-process host collaborator
//!
//! The relay filter and duplicator source are plugins: they live inside a
//! media-compositing host and only touch it through a handful of primitives.
//! This module provides those primitives:
//!
//! - a source graph with name lookup and filter enumeration (`Host`, `Source`)
//! - weak references that must be upgraded per use (`WeakSource`, `WeakHost`)
//! - a named signal bus and a named procedure bus per source
//! - async video/audio output queues
//! - settings, property sheets and an offscreen render target
//! - a periodic frame loop driving tick and render callbacks

pub mod config;
pub mod error;
pub mod graph;
pub mod info;
pub mod output;
pub mod procs;
pub mod properties;
pub mod render;
pub mod settings;
pub mod signal;
pub mod source;

pub use config::HostConfig;
pub use error::HostError;
pub use graph::{CallbackId, Host, RenderCallback, WeakHost};
pub use info::{OutputFlags, SourceImpl, SourceInfo, SourceKind};
pub use output::AsyncOutput;
pub use procs::ProcHandler;
pub use properties::{ListItem, Properties, Property, PropertyKind};
pub use render::TexRender;
pub use settings::Settings;
pub use signal::{CallData, ListenerId, SignalHandler};
pub use source::{Source, SourceId, SourceRef, WeakSource};
