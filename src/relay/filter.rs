//! Relay filter implementation
//!
//! Attached to an upstream source, the relay filter passes every frame and
//! audio packet through unchanged and broadcasts a copy on its own signal
//! bus. Duplicator sources subscribe to those signals and drive the
//! filter's showing/active reference counts through its procedure bus.
//!
//! ```text
//!   [Upstream source]
//!         │ output_video / output_audio
//!         ▼
//!   RelayFilter::filter_video ──► returns frame unchanged ──► host pipeline
//!         │
//!         └─ emit "output_video" ──► Duplicator 1, Duplicator 2, ...
//!
//!   Duplicator ── call "inc_showing" ──► show_refs 0->1 ──► parent.inc_showing()
//! ```

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use super::guard::BroadcastGuard;
use super::stats::{RelayCounters, RelayStats};
use crate::constants::*;
use crate::counter::{Edge, EdgeCounter};
use crate::host::{
    CallData, CallbackId, Settings, Source, SourceImpl, SourceRef, TexRender,
    WeakHost, WeakSource,
};
use crate::media::{AudioData, SourceAudio, VideoFrame};

/// Frame relay attached to one parent source
pub struct RelayFilter {
    /// The filter's own host context
    context: WeakSource,
    host: WeakHost,

    video_guard: BroadcastGuard,
    audio_guard: BroadcastGuard,

    /// Duplicators currently showing this filter
    show_refs: EdgeCounter,
    /// Duplicators currently active
    active_refs: EdgeCounter,

    /// 1x1 target for forcing the parent to render offscreen
    texrender: Mutex<TexRender>,
    render_callback: Mutex<Option<CallbackId>>,

    counters: RelayCounters,
}

/// Wrap a method as a procedure that holds only a weak reference
fn weak_proc(filter: &Arc<RelayFilter>, f: fn(&RelayFilter)) -> impl Fn() + Send + Sync + 'static {
    let weak = Arc::downgrade(filter);
    move || {
        if let Some(filter) = weak.upgrade() {
            f(&filter);
        }
    }
}

impl RelayFilter {
    /// Create the filter for a new host context
    ///
    /// Declares the output signals, registers the lifecycle procedures and
    /// hooks the main render loop.
    pub fn create(_settings: &Settings, context: &SourceRef) -> Arc<Self> {
        let filter = Arc::new(Self {
            context: context.downgrade(),
            host: context.host(),
            video_guard: BroadcastGuard::new(),
            audio_guard: BroadcastGuard::new(),
            show_refs: EdgeCounter::new(),
            active_refs: EdgeCounter::new(),
            texrender: Mutex::new(TexRender::new()),
            render_callback: Mutex::new(None),
            counters: RelayCounters::default(),
        });

        context
            .signals()
            .add_signals(&[SIGNAL_OUTPUT_VIDEO, SIGNAL_OUTPUT_AUDIO]);

        let procs = context.procs();
        procs.add(PROC_INC_SHOWING, weak_proc(&filter, RelayFilter::inc_showing));
        procs.add(PROC_DEC_SHOWING, weak_proc(&filter, RelayFilter::dec_showing));
        procs.add(PROC_INC_ACTIVE, weak_proc(&filter, RelayFilter::inc_active));
        procs.add(PROC_DEC_ACTIVE, weak_proc(&filter, RelayFilter::dec_active));

        if let Some(host) = filter.host.upgrade() {
            let weak = Arc::downgrade(&filter);
            let id = host.add_main_render_callback(move |cx, cy| {
                if let Some(filter) = weak.upgrade() {
                    filter.offscreen_render(cx, cy);
                }
            });
            *filter.render_callback.lock() = Some(id);
        }

        filter
    }

    /// Source this filter is attached to
    fn parent(&self) -> Option<SourceRef> {
        self.context.upgrade()?.parent()
    }

    fn broadcast_video(&self, frame: &VideoFrame) {
        let Some(context) = self.context.upgrade() else {
            return;
        };
        context
            .signals()
            .emit(SIGNAL_OUTPUT_VIDEO, &CallData::Frame(frame.clone()));
        RelayCounters::bump(&self.counters.video_broadcasts);
    }

    fn broadcast_audio(&self, audio: &AudioData) {
        let info = self
            .host
            .upgrade()
            .and_then(|host| host.audio_output_info());
        let Some(info) = info else {
            RelayCounters::bump(&self.counters.audio_format_missing);
            return;
        };
        let Some(context) = self.context.upgrade() else {
            return;
        };

        let packet = SourceAudio::from_raw(audio, &info);
        context
            .signals()
            .emit(SIGNAL_OUTPUT_AUDIO, &CallData::Audio(packet));
        RelayCounters::bump(&self.counters.audio_broadcasts);
    }

    /// A duplicator started showing this filter
    pub fn inc_showing(&self) {
        if self.show_refs.increment() == Some(Edge::Rose) {
            tracing::debug!("Relay showing, forwarding to parent");
            if let Some(parent) = self.parent() {
                parent.inc_showing();
            }
        }
    }

    /// A duplicator stopped showing this filter
    pub fn dec_showing(&self) {
        if self.show_refs.decrement() == Some(Edge::Fell) {
            tracing::debug!("Relay hidden, forwarding to parent");
            if let Some(parent) = self.parent() {
                parent.dec_showing();
            }
        }
    }

    /// A duplicator became active
    pub fn inc_active(&self) {
        if self.active_refs.increment() == Some(Edge::Rose) {
            tracing::debug!("Relay active, forwarding to parent");
            if let Some(parent) = self.parent() {
                parent.inc_active();
            }
        }
    }

    /// A duplicator became inactive
    pub fn dec_active(&self) {
        if self.active_refs.decrement() == Some(Edge::Fell) {
            tracing::debug!("Relay inactive, forwarding to parent");
            if let Some(parent) = self.parent() {
                parent.dec_active();
            }
        }
    }

    /// Whether any duplicator is showing this filter
    pub fn is_showing(&self) -> bool {
        self.show_refs.is_raised()
    }

    /// Whether any duplicator is active
    pub fn is_active(&self) -> bool {
        self.active_refs.is_raised()
    }

    /// Force the parent to render while a duplicator is showing
    ///
    /// Rendering drives the parent's own frame production, so frames keep
    /// reaching duplicators even when the parent is not on screen.
    fn offscreen_render(&self, _cx: u32, _cy: u32) {
        if !self.show_refs.is_raised() {
            return;
        }
        let Some(parent) = self.parent() else {
            return;
        };
        // Only the render thread touches the target; never wait on it
        let Some(mut tex) = self.texrender.try_lock() else {
            return;
        };

        tex.reset();
        if !tex.begin(1, 1) {
            return;
        }
        parent.video_render();
        tex.end();
    }

    /// Completed offscreen render passes
    pub fn offscreen_passes(&self) -> u64 {
        self.texrender.lock().render_passes()
    }

    /// Counter snapshot
    pub fn stats(&self) -> RelayStats {
        self.counters.snapshot()
    }
}

impl SourceImpl for RelayFilter {
    fn filter_video(&self, frame: VideoFrame) -> Option<VideoFrame> {
        match self.video_guard.enter() {
            Some(_in_flight) => self.broadcast_video(&frame),
            None => {
                // A duplicator's output looped back into this filter
                RelayCounters::bump(&self.counters.video_reentries_dropped);
                tracing::trace!(timestamp = frame.timestamp, "Reentrant video broadcast dropped");
            }
        }
        Some(frame)
    }

    fn filter_audio(&self, audio: AudioData) -> Option<AudioData> {
        match self.audio_guard.enter() {
            Some(_in_flight) => self.broadcast_audio(&audio),
            None => {
                RelayCounters::bump(&self.counters.audio_reentries_dropped);
                tracing::trace!(timestamp = audio.timestamp, "Reentrant audio broadcast dropped");
            }
        }
        Some(audio)
    }

    fn filter_remove(&self, parent: &Source) {
        let (active, showing) = (self.is_active(), self.is_showing());

        while self.active_refs.is_raised() {
            self.dec_active();
        }
        while self.show_refs.is_raised() {
            self.dec_showing();
        }

        if active || showing {
            tracing::info!(
                source = %parent.name(),
                active = active,
                showing = showing,
                "Relay filter removed, released parent references"
            );
        }
    }

    fn destroy(&self) {
        let id = self.render_callback.lock().take();
        if let (Some(id), Some(host)) = (id, self.host.upgrade()) {
            host.remove_main_render_callback(id);
        }
        tracing::debug!("Relay filter destroyed");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
