//! End-to-end fan-out behavior through a host with the plugin registered

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use proptest::prelude::*;
use tracing_subscriber::EnvFilter;

use srcdup::constants::*;
use srcdup::duplicator::{DuplicatorConfig, DuplicatorSource};
use srcdup::host::{Host, OutputFlags, Settings, SourceImpl, SourceInfo, SourceKind, SourceRef};
use srcdup::media::{AudioData, AudioOutputInfo, SourceAudio, VideoFormat, VideoFrame};
use srcdup::relay::RelayFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Capture device counting lifecycle transitions
#[derive(Default)]
struct Device {
    shows: AtomicUsize,
    hides: AtomicUsize,
    activations: AtomicUsize,
    deactivations: AtomicUsize,
}

impl SourceImpl for Device {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }

    fn activate(&self) {
        self.activations.fetch_add(1, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.deactivations.fetch_add(1, Ordering::SeqCst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn setup() -> Host {
    init_tracing();
    let host = Host::new();
    srcdup::register(&host, DuplicatorConfig::default());
    host.register_source_type(SourceInfo::new(
        "device",
        SourceKind::Input,
        OutputFlags::ASYNC_VIDEO | OutputFlags::AUDIO,
        |_, _| Arc::new(Device::default()),
    ));
    host
}

fn device(host: &Host, name: &str) -> SourceRef {
    host.create_source("device", name, &Settings::new()).unwrap()
}

fn attach_relay(host: &Host, source: &SourceRef, name: &str) -> SourceRef {
    let relay = host
        .create_filter(FILTER_ID, name, &Settings::new())
        .unwrap();
    source.add_filter(Arc::clone(&relay)).unwrap();
    relay
}

fn duplicator(host: &Host, name: &str, target: &str) -> SourceRef {
    let settings = Settings::new().with_string(SETTING_TARGET_SOURCE_NAME, target);
    host.create_source(SOURCE_ID, name, &settings).unwrap()
}

fn dup(source: &SourceRef) -> &DuplicatorSource {
    source.imp_as::<DuplicatorSource>().unwrap()
}

fn relay(source: &SourceRef) -> &RelayFilter {
    source.imp_as::<RelayFilter>().unwrap()
}

fn counts(source: &SourceRef) -> &Device {
    source.imp_as::<Device>().unwrap()
}

fn frame(timestamp: u64) -> VideoFrame {
    VideoFrame::new(VideoFormat::Nv12, 2, 2, timestamp)
        .with_plane(Bytes::from_static(&[16, 16, 16, 16]), 2)
        .with_plane(Bytes::from_static(&[128, 128]), 2)
}

#[test]
fn test_fanout_to_every_duplicator() {
    let host = setup();
    let camera = device(&host, "Camera");
    let filter = attach_relay(&host, &camera, "Relay");
    let mirrors: Vec<SourceRef> = (1..=3)
        .map(|n| duplicator(&host, &format!("Mirror {}", n), "Camera"))
        .collect();

    camera.output_video(frame(1));
    camera.output_video(frame(2));

    for mirror in &mirrors {
        let received = mirror.with_output(|out| out.drain_video());
        assert_eq!(received, vec![frame(1), frame(2)]);
    }
    // The upstream source still gets its own frames
    assert_eq!(camera.with_output(|out| out.video_received()), 2);
    assert_eq!(relay(&filter).stats().video_broadcasts, 2);
}

#[test]
fn test_pass_through_fidelity() {
    let host = setup();
    host.reset_audio(AudioOutputInfo::default());
    let camera = device(&host, "Camera");
    attach_relay(&host, &camera, "Relay");
    let mirror = duplicator(&host, "Mirror", "Camera");

    let original = frame(42);
    camera.output_video(original.clone());
    assert_eq!(camera.with_output(|out| out.drain_video()), vec![original.clone()]);
    assert_eq!(mirror.with_output(|out| out.drain_video()), vec![original]);

    let packet = SourceAudio::from_raw(
        &AudioData::new(
            vec![Bytes::from_static(&[0; 16]), Bytes::from_static(&[1; 16])],
            4,
            1_000,
        ),
        &AudioOutputInfo::default(),
    );
    camera.output_audio(packet.clone());
    assert_eq!(
        camera.with_output(|out| out.drain_audio()),
        vec![packet.to_raw()]
    );
    assert_eq!(
        mirror.with_output(|out| out.drain_audio()),
        vec![packet.to_raw()]
    );
}

#[test]
fn test_audio_skipped_without_output_format() {
    let host = setup();
    let camera = device(&host, "Camera");
    let filter = attach_relay(&host, &camera, "Relay");
    let mirror = duplicator(&host, "Mirror", "Camera");

    let raw = AudioData::new(vec![Bytes::from_static(&[0; 8])], 2, 5);
    camera.output_audio(SourceAudio::from_raw(&raw, &AudioOutputInfo::default()));

    // Upstream audio is unaffected, nothing is broadcast
    assert_eq!(camera.with_output(|out| out.audio_received()), 1);
    assert_eq!(mirror.with_output(|out| out.audio_received()), 0);
    assert_eq!(relay(&filter).stats().audio_format_missing, 1);

    host.reset_audio(AudioOutputInfo::default());
    camera.output_audio(SourceAudio::from_raw(&raw, &AudioOutputInfo::default()));
    assert_eq!(mirror.with_output(|out| out.audio_received()), 1);
}

#[test]
fn test_no_double_broadcast_on_feedback_loop() {
    let host = setup();
    host.reset_audio(AudioOutputInfo::default());
    let mirror = duplicator(&host, "Mirror", "Mirror");
    let watcher = duplicator(&host, "Watcher", "Mirror");

    // Relay on the duplicator itself: its output feeds back into the filter
    let filter = dup(&mirror).add_relay_filter("Mirror").unwrap();
    assert_eq!(dup(&mirror).bound_target().unwrap().id(), filter.id());

    mirror.output_video(frame(7));

    let stats = relay(&filter).stats();
    assert_eq!(stats.video_broadcasts, 1);
    assert_eq!(stats.video_reentries_dropped, 1);
    // Original plus the single looped-back copy
    assert_eq!(mirror.with_output(|out| out.video_received()), 2);

    // Other subscribers see exactly one copy
    host.tick(3.5);
    assert!(dup(&watcher).is_bound());
    mirror.output_video(frame(8));
    assert_eq!(watcher.with_output(|out| out.drain_video()), vec![frame(8)]);

    let raw = AudioData::new(vec![Bytes::from_static(&[3; 8])], 2, 9);
    mirror.output_audio(SourceAudio::from_raw(&raw, &AudioOutputInfo::default()));
    let stats = relay(&filter).stats();
    assert_eq!(stats.audio_broadcasts, 1);
    assert_eq!(stats.audio_reentries_dropped, 1);
}

#[test]
fn test_edge_triggered_lifecycle() {
    let host = setup();
    let camera = device(&host, "Camera");
    let filter = attach_relay(&host, &camera, "Relay");
    let first = duplicator(&host, "Mirror 1", "Camera");
    let second = duplicator(&host, "Mirror 2", "Camera");

    first.inc_showing();
    second.inc_showing();
    first.inc_active();
    second.inc_active();
    assert!(relay(&filter).is_showing());
    assert_eq!(counts(&camera).shows.load(Ordering::SeqCst), 1);
    assert_eq!(counts(&camera).activations.load(Ordering::SeqCst), 1);

    first.dec_showing();
    first.dec_active();
    assert!(camera.is_showing());
    assert!(camera.is_active());
    assert_eq!(counts(&camera).hides.load(Ordering::SeqCst), 0);

    second.dec_showing();
    second.dec_active();
    assert!(!camera.is_showing());
    assert!(!camera.is_active());
    assert_eq!(counts(&camera).hides.load(Ordering::SeqCst), 1);
    assert_eq!(counts(&camera).deactivations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_self_healing_after_filter_replaced() {
    let host = setup();
    let camera = device(&host, "Camera");
    let old = attach_relay(&host, &camera, "Relay X");
    let mirror = duplicator(&host, "Mirror", "Camera");
    mirror.inc_showing();
    assert!(camera.is_showing());

    // Removing the filter releases the parent references it held
    assert!(camera.remove_filter(&old));
    drop(old);
    assert!(!camera.is_showing());
    assert!(!dup(&mirror).is_bound());

    let new = attach_relay(&host, &camera, "Relay Y");
    host.tick(1.0);
    assert!(!dup(&mirror).is_bound());

    host.tick(2.5);
    assert_eq!(dup(&mirror).bound_target().unwrap().id(), new.id());
    assert!(camera.is_showing());

    camera.output_video(frame(3));
    assert_eq!(mirror.with_output(|out| out.drain_video()), vec![frame(3)]);
}

#[test]
fn test_rebinds_on_name_change() {
    let host = setup();
    let a = device(&host, "A");
    let b = device(&host, "B");
    attach_relay(&host, &a, "Relay");
    let relay_b = attach_relay(&host, &b, "Relay");
    let mirror = duplicator(&host, "Mirror", "A");
    mirror.inc_showing();
    assert!(a.is_showing());

    mirror.update(&Settings::new().with_string(SETTING_TARGET_SOURCE_NAME, "B"));

    // No tick needed
    assert_eq!(dup(&mirror).bound_target().unwrap().id(), relay_b.id());
    assert!(!a.is_showing());
    assert!(b.is_showing());

    a.output_video(frame(1));
    b.output_video(frame(2));
    assert_eq!(mirror.with_output(|out| out.drain_video()), vec![frame(2)]);
}

#[test]
fn test_follows_source_rename() {
    let host = setup();
    let camera = device(&host, "Camera");
    attach_relay(&host, &camera, "Relay");
    let mirror = duplicator(&host, "Mirror", "Camera");
    assert!(dup(&mirror).is_bound());

    host.rename_source("Camera", "Webcam").unwrap();
    host.tick(3.5);
    assert!(!dup(&mirror).is_bound());

    host.rename_source("Webcam", "Camera").unwrap();
    host.tick(3.5);
    assert!(dup(&mirror).is_bound());
}

#[test]
fn test_removed_duplicator_releases_filter() {
    let host = setup();
    let camera = device(&host, "Camera");
    let filter = attach_relay(&host, &camera, "Relay");
    let mirror = duplicator(&host, "Mirror", "Camera");
    mirror.inc_showing();
    mirror.inc_active();

    host.remove_source("Mirror").unwrap();
    drop(mirror);

    assert_eq!(filter.signals().listener_count(SIGNAL_OUTPUT_VIDEO), 0);
    assert_eq!(filter.signals().listener_count(SIGNAL_OUTPUT_AUDIO), 0);
    assert!(!relay(&filter).is_showing());
    assert!(!camera.is_showing());
    assert!(!camera.is_active());
}

#[test]
fn test_removed_filter_absorbs_late_lifecycle_calls() {
    let host = setup();
    let camera = device(&host, "Camera");
    let other = device(&host, "Other");
    let old = attach_relay(&host, &camera, "Relay");
    attach_relay(&host, &other, "Relay");
    let mirror = duplicator(&host, "Mirror", "Camera");
    mirror.inc_showing();
    mirror.inc_active();

    // Unwound once; `old` stays alive and the duplicator stays bound to it
    assert!(camera.remove_filter(&old));
    assert!(!camera.is_showing());
    assert!(!camera.is_active());
    assert_eq!(dup(&mirror).bound_target().unwrap().id(), old.id());

    // Hiding against the detached filter saturates at zero
    mirror.dec_showing();
    mirror.dec_active();
    assert!(!relay(&old).is_showing());
    assert!(!relay(&old).is_active());

    // Showing again raises the filter but it has no parent to forward to
    mirror.inc_showing();
    assert!(relay(&old).is_showing());
    assert!(!camera.is_showing());

    // Rebinding releases the detached filter without touching any parent
    mirror.update(&Settings::new().with_string(SETTING_TARGET_SOURCE_NAME, "Other"));
    assert!(!relay(&old).is_showing());
    assert!(other.is_showing());
    mirror.dec_showing();
    assert!(!other.is_showing());

    let device = counts(&camera);
    assert_eq!(device.shows.load(Ordering::SeqCst), 1);
    assert_eq!(device.hides.load(Ordering::SeqCst), 1);
    assert_eq!(device.activations.load(Ordering::SeqCst), 1);
    assert_eq!(device.deactivations.load(Ordering::SeqCst), 1);
    let device = counts(&other);
    assert_eq!(device.shows.load(Ordering::SeqCst), 1);
    assert_eq!(device.hides.load(Ordering::SeqCst), 1);
    assert_eq!(device.activations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_add_filter_button_binds() {
    let host = setup();
    let camera = device(&host, "Camera");
    let mirror = duplicator(&host, "Mirror", "Camera");
    mirror.inc_showing();

    let props = mirror.properties();
    assert!(props.get(PROPERTY_ADD_FILTER).unwrap().visible);
    assert_eq!(props.click(PROPERTY_ADD_FILTER), Some(true));

    assert!(dup(&mirror).is_bound());
    assert!(camera.is_showing());
    assert!(!mirror.properties().get(PROPERTY_ADD_FILTER).unwrap().visible);
}

#[tokio::test(start_paused = true)]
async fn test_frame_loop_reconciles() {
    init_tracing();
    let host = Host::new();
    srcdup::register(
        &host,
        DuplicatorConfig::default().reconcile_interval(Duration::from_millis(200)),
    );
    host.register_source_type(SourceInfo::new(
        "device",
        SourceKind::Input,
        OutputFlags::ASYNC_VIDEO,
        |_, _| Arc::new(Device::default()),
    ));

    let mirror = duplicator(&host, "Mirror", "Camera");
    let camera = device(&host, "Camera");
    attach_relay(&host, &camera, "Relay");
    assert!(!dup(&mirror).is_bound());

    let frame_loop = host.spawn_frame_loop();
    tokio::time::sleep(Duration::from_millis(500)).await;
    frame_loop.abort();

    assert!(dup(&mirror).is_bound());
}

proptest! {
    #[test]
    fn prop_lifecycle_balanced(ops in proptest::collection::vec((0usize..3, any::<bool>(), any::<bool>()), 0..40)) {
        let host = setup();
        let camera = device(&host, "Camera");
        attach_relay(&host, &camera, "Relay");
        let mirrors: Vec<SourceRef> = (0..3)
            .map(|n| duplicator(&host, &format!("Mirror {}", n), "Camera"))
            .collect();
        let mut shown = [false; 3];
        let mut active = [false; 3];

        for (idx, lifecycle, on) in ops {
            let mirror = &mirrors[idx];
            match (lifecycle, on) {
                (true, true) if !shown[idx] => { mirror.inc_showing(); shown[idx] = true; }
                (true, false) if shown[idx] => { mirror.dec_showing(); shown[idx] = false; }
                (false, true) if !active[idx] => { mirror.inc_active(); active[idx] = true; }
                (false, false) if active[idx] => { mirror.dec_active(); active[idx] = false; }
                _ => {}
            }
            prop_assert_eq!(camera.is_showing(), shown.iter().any(|s| *s));
            prop_assert_eq!(camera.is_active(), active.iter().any(|a| *a));
        }

        for (idx, mirror) in mirrors.iter().enumerate() {
            if shown[idx] {
                mirror.dec_showing();
            }
            if active[idx] {
                mirror.dec_active();
            }
        }

        let device = counts(&camera);
        prop_assert!(!camera.is_showing());
        prop_assert!(!camera.is_active());
        prop_assert_eq!(device.shows.load(Ordering::SeqCst), device.hides.load(Ordering::SeqCst));
        prop_assert_eq!(
            device.activations.load(Ordering::SeqCst),
            device.deactivations.load(Ordering::SeqCst)
        );
    }

    #[test]
    fn prop_balanced_across_rebinds(ops in proptest::collection::vec(0u8..7, 0..60)) {
        let host = setup();
        let a = device(&host, "A");
        let b = device(&host, "B");
        let relay_a = attach_relay(&host, &a, "Relay");
        let relay_b = attach_relay(&host, &b, "Relay");
        let mirror = duplicator(&host, "Mirror", "");
        let imp = dup(&mirror);

        let mut shown = false;
        let mut active = false;
        let mut target = "";

        for op in ops {
            match op {
                0 => { imp.show(); shown = true; }
                1 => { imp.hide(); shown = false; }
                2 => { imp.activate(); active = true; }
                3 => { imp.deactivate(); active = false; }
                4 => target = "A",
                5 => target = "B",
                _ => target = "",
            }
            if op >= 4 {
                mirror.update(&Settings::new().with_string(SETTING_TARGET_SOURCE_NAME, target));
            }

            for (name, parent, filter) in [("A", &a, &relay_a), ("B", &b, &relay_b)] {
                let bound = target == name;
                prop_assert_eq!(parent.is_showing(), shown && bound);
                prop_assert_eq!(parent.is_active(), active && bound);
                prop_assert_eq!(filter.signals().listener_count(SIGNAL_OUTPUT_VIDEO), bound as usize);
                prop_assert_eq!(filter.signals().listener_count(SIGNAL_OUTPUT_AUDIO), bound as usize);
            }
        }

        imp.hide();
        imp.deactivate();
        for parent in [&a, &b] {
            let device = counts(parent);
            prop_assert!(!parent.is_showing());
            prop_assert!(!parent.is_active());
            prop_assert_eq!(device.shows.load(Ordering::SeqCst), device.hides.load(Ordering::SeqCst));
            prop_assert_eq!(
                device.activations.load(Ordering::SeqCst),
                device.deactivations.load(Ordering::SeqCst)
            );
        }
    }
}
