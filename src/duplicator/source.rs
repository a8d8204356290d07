//! Duplicator source implementation
//!
//! A duplicator is an output-only source configured with the name of a
//! source expected to carry a relay filter. It resolves that name, subscribes
//! to the filter's output signals and republishes every frame as its own
//! async output. The filter is only ever held weakly: the user can rename,
//! remove or re-add things at any time, so the binding is re-validated on a
//! timer and rebuilt whenever the name no longer resolves to the same filter.
//!
//! While bound, the duplicator's own showing/active state is mirrored onto
//! the filter through its lifecycle procedures, exactly one reference each,
//! so the filter's counts always equal the number of live duplicators
//! showing/activating it.

use std::any::Any;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::binding::{Binding, BoundTarget};
use super::config::DuplicatorConfig;
use super::properties;
use super::resolve::resolve_relay_filter;
use crate::constants::*;
use crate::host::{
    HostError, Properties, Settings, Source, SourceImpl, SourceRef, WeakHost, WeakSource,
};
use crate::media::{SourceAudio, VideoFrame};

/// Output-only source mirroring a relay filter
pub struct DuplicatorSource {
    context: WeakSource,
    host: WeakHost,
    config: DuplicatorConfig,
    this: Weak<DuplicatorSource>,

    binding: Mutex<Binding>,
}

/// Call a lifecycle procedure, logging failure
fn call_proc(target: &Source, name: &str) {
    if let Err(err) = target.procs().call(name) {
        tracing::warn!(filter = %target.name(), error = %err, "Lifecycle call failed");
    }
}

impl DuplicatorSource {
    /// Create the duplicator for a new host context and apply its settings
    pub fn create(settings: &Settings, context: &SourceRef, config: DuplicatorConfig) -> Arc<Self> {
        let interval = config.reconcile_seconds();
        let dup = Arc::new_cyclic(|this| Self {
            context: context.downgrade(),
            host: context.host(),
            config,
            this: this.clone(),
            binding: Mutex::new(Binding::new(interval)),
        });

        dup.apply_settings(settings);
        dup
    }

    /// Default settings
    pub fn defaults(settings: &mut Settings) {
        settings.set_default_string(SETTING_TARGET_SOURCE_NAME, "");
        settings.set_default_bool(SETTING_BUFFERED, true);
    }

    fn context_name(&self) -> String {
        self.context
            .upgrade()
            .map(|ctx| ctx.name())
            .unwrap_or_default()
    }

    fn resolve(&self, name: &str) -> Option<SourceRef> {
        let host = self.host.upgrade()?;
        resolve_relay_filter(&host, name)
    }

    fn output_video(&self, frame: &VideoFrame) {
        if let Some(context) = self.context.upgrade() {
            context.output_video(frame.clone());
        }
    }

    fn output_audio(&self, audio: &SourceAudio) {
        if let Some(context) = self.context.upgrade() {
            context.output_audio(audio.clone());
        }
    }

    /// Unsubscribe from the current target and return its references
    fn unbind(&self, binding: &mut Binding) {
        let Some(bound) = binding.target.take() else {
            return;
        };

        // A destroyed filter took its listeners and counts with it
        let Some(target) = bound.live() else {
            tracing::debug!(source = %self.context_name(), "Dropped binding to destroyed filter");
            return;
        };

        target.signals().disconnect(SIGNAL_OUTPUT_VIDEO, bound.video);
        target.signals().disconnect(SIGNAL_OUTPUT_AUDIO, bound.audio);

        if binding.shown {
            call_proc(&target, PROC_DEC_SHOWING);
        }
        if binding.activated {
            call_proc(&target, PROC_DEC_ACTIVE);
        }

        tracing::info!(
            source = %self.context_name(),
            filter = %target.name(),
            "Unbound from relay filter"
        );
    }

    /// Replace the current target
    ///
    /// Unbinds first, then subscribes to `target` (if any) and hands it the
    /// references this duplicator currently owes. Always re-arms the
    /// reconciliation timer.
    fn bind(&self, binding: &mut Binding, target: Option<SourceRef>) {
        self.unbind(binding);
        binding.rearm(self.config.reconcile_seconds());

        let Some(target) = target else {
            return;
        };

        let weak = self.this.clone();
        let video = target.signals().connect(SIGNAL_OUTPUT_VIDEO, move |data| {
            if let (Some(dup), Some(frame)) = (weak.upgrade(), data.frame()) {
                dup.output_video(frame);
            }
        });
        let video = match video {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(filter = %target.name(), error = %err, "Cannot subscribe to relay filter");
                return;
            }
        };

        let weak = self.this.clone();
        let audio = target.signals().connect(SIGNAL_OUTPUT_AUDIO, move |data| {
            if let (Some(dup), Some(audio)) = (weak.upgrade(), data.audio()) {
                dup.output_audio(audio);
            }
        });
        let audio = match audio {
            Ok(id) => id,
            Err(err) => {
                target.signals().disconnect(SIGNAL_OUTPUT_VIDEO, video);
                tracing::warn!(filter = %target.name(), error = %err, "Cannot subscribe to relay filter");
                return;
            }
        };

        binding.target = Some(BoundTarget {
            weak: target.downgrade(),
            id: target.id(),
            video,
            audio,
        });

        if binding.shown {
            call_proc(&target, PROC_INC_SHOWING);
        }
        if binding.activated {
            call_proc(&target, PROC_INC_ACTIVE);
        }

        tracing::info!(
            source = %self.context_name(),
            filter = %target.name(),
            id = %target.id(),
            "Bound to relay filter"
        );
    }

    /// Re-resolve the configured name and rebind if it no longer leads to
    /// the bound filter
    ///
    /// Idempotent when the binding is already consistent. Always re-arms the
    /// timer.
    fn reconcile(&self, binding: &mut Binding) {
        let resolved = binding
            .target_name
            .clone()
            .and_then(|name| self.resolve(&name));

        let fresh = resolved.as_ref().map(|filter| filter.id());
        if binding.is_dangling() || binding.live_id() != fresh {
            tracing::debug!(
                source = %self.context_name(),
                bound = ?binding.live_id(),
                resolved = ?fresh,
                "Binding drifted, rebinding"
            );
            self.bind(binding, resolved);
        } else {
            binding.rearm(self.config.reconcile_seconds());
        }
    }

    fn apply_settings(&self, settings: &Settings) {
        let name = settings.get_string(SETTING_TARGET_SOURCE_NAME);
        {
            let mut binding = self.binding.lock();
            if binding.target_name.as_deref() != Some(name) {
                binding.target_name = Some(name.to_string());
                let target = self.resolve(name);
                self.bind(&mut binding, target);
            }
        }

        let buffered = settings.get_bool(SETTING_BUFFERED);
        if let Some(context) = self.context.upgrade() {
            context.set_async_unbuffered(!buffered);
        }
    }

    /// Attach a new relay filter to the named source, then reconcile
    ///
    /// Binding follows the configured target name: the new filter is bound
    /// only when `source_name` is that target. The filter is named after the
    /// configured display name, with a numeric suffix if that name is taken
    /// on the source.
    pub fn add_relay_filter(&self, source_name: &str) -> Result<SourceRef, HostError> {
        let host = self
            .host
            .upgrade()
            .ok_or_else(|| HostError::SourceNotFound(source_name.to_string()))?;
        let source = host
            .get_source_by_name(source_name)
            .ok_or_else(|| HostError::SourceNotFound(source_name.to_string()))?;

        let filter_name = unique_filter_name(&source, &self.config.filter_display_name);
        let filter = host.create_filter(FILTER_ID, &filter_name, &Settings::new())?;
        source.add_filter(Arc::clone(&filter))?;

        tracing::info!(source = %source_name, filter = %filter_name, "Relay filter added");

        let mut binding = self.binding.lock();
        self.reconcile(&mut binding);

        Ok(filter)
    }

    /// Configured target name
    pub fn target_name(&self) -> Option<String> {
        self.binding.lock().target_name.clone()
    }

    /// The bound relay filter, if bound and alive
    pub fn bound_target(&self) -> Option<SourceRef> {
        self.binding.lock().live_target()
    }

    pub fn is_bound(&self) -> bool {
        self.bound_target().is_some()
    }

    pub fn is_shown(&self) -> bool {
        self.binding.lock().shown
    }

    pub fn is_activated(&self) -> bool {
        self.binding.lock().activated
    }

    pub(crate) fn config(&self) -> &DuplicatorConfig {
        &self.config
    }

    pub(crate) fn self_ref(&self) -> Weak<DuplicatorSource> {
        self.this.clone()
    }

    pub(crate) fn context(&self) -> &WeakSource {
        &self.context
    }

    pub(crate) fn host(&self) -> &WeakHost {
        &self.host
    }
}

/// `base`, or `base N` for the smallest N >= 2 not already used on `source`
pub(crate) fn unique_filter_name(source: &Source, base: &str) -> String {
    if source.find_filter_by_name(base).is_none() {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{} {}", base, n))
        .find(|candidate| source.find_filter_by_name(candidate).is_none())
        .unwrap_or_else(|| base.to_string())
}

impl SourceImpl for DuplicatorSource {
    fn update(&self, settings: &Settings) {
        self.apply_settings(settings);
    }

    fn destroy(&self) {
        let mut binding = self.binding.lock();
        self.unbind(&mut binding);
    }

    fn video_tick(&self, seconds: f32) {
        let mut binding = self.binding.lock();
        if binding.countdown(seconds) {
            self.reconcile(&mut binding);
        }
    }

    fn show(&self) {
        let mut binding = self.binding.lock();
        if binding.shown {
            return;
        }
        if let Some(target) = binding.live_target() {
            call_proc(&target, PROC_INC_SHOWING);
        }
        binding.shown = true;
    }

    fn hide(&self) {
        let mut binding = self.binding.lock();
        if !binding.shown {
            return;
        }
        if let Some(target) = binding.live_target() {
            call_proc(&target, PROC_DEC_SHOWING);
        }
        binding.shown = false;
    }

    fn activate(&self) {
        let mut binding = self.binding.lock();
        if binding.activated {
            return;
        }
        if let Some(target) = binding.live_target() {
            call_proc(&target, PROC_INC_ACTIVE);
        }
        binding.activated = true;
    }

    fn deactivate(&self) {
        let mut binding = self.binding.lock();
        if !binding.activated {
            return;
        }
        if let Some(target) = binding.live_target() {
            call_proc(&target, PROC_DEC_ACTIVE);
        }
        binding.activated = false;
    }

    fn get_properties(&self) -> Properties {
        properties::build(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
