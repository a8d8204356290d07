//! Fan-out demo - one synthetic camera mirrored by several duplicators
//!
//! Run with: cargo run --example fanout -- [SECONDS] [MIRRORS]
//!
//! This example demonstrates:
//! - Registering the relay filter and duplicator source types with a host
//! - Adding a relay filter through a duplicator's property sheet
//! - A duplicator's show/hide driving the camera's own lifecycle
//! - The host frame loop forcing offscreen renders of a hidden camera
//!
//! # Layout
//!
//! ```text
//!   TestPattern "Camera" ── RelayFilter ──┬──► "Mirror 1"
//!        ▲                                ├──► "Mirror 2"
//!        │ showing only while a           └──► ...
//!        │ mirror is shown
//! ```
//!
//! Set `RUST_LOG=srcdup=debug` to watch binding and lifecycle events.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use srcdup::constants::{PROPERTY_ADD_FILTER, SETTING_TARGET_SOURCE_NAME, SOURCE_ID};
use srcdup::duplicator::{find_relay_filter, DuplicatorConfig};
use srcdup::host::{Host, HostConfig, OutputFlags, Settings, SourceImpl, SourceInfo, SourceKind};
use srcdup::media::{VideoFormat, VideoFrame};
use srcdup::relay::RelayFilter;

/// Synthetic source producing a solid-color frame whenever it is shown
#[derive(Default)]
struct TestPattern {
    running: AtomicBool,
    renders: AtomicU64,
}

impl SourceImpl for TestPattern {
    fn show(&self) {
        println!("Camera: shown");
        self.running.store(true, Ordering::Relaxed);
    }

    fn hide(&self) {
        println!("Camera: hidden");
        self.running.store(false, Ordering::Relaxed);
    }

    fn video_render(&self) {
        self.renders.fetch_add(1, Ordering::Relaxed);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn print_usage() {
    eprintln!("Usage: fanout [SECONDS] [MIRRORS]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  SECONDS    How long to run (default: 3)");
    eprintln!("  MIRRORS    Number of duplicators (default: 2)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let seconds: u64 = match args.get(1) {
        Some(arg) => arg.parse()?,
        None => 3,
    };
    let mirrors: usize = match args.get(2) {
        Some(arg) => arg.parse()?,
        None => 2,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("srcdup=info".parse()?),
        )
        .init();

    let host = Host::with_config(HostConfig::default().fps(30));
    srcdup::register(
        &host,
        DuplicatorConfig::default().reconcile_interval(Duration::from_secs(1)),
    );
    host.register_source_type(SourceInfo::new(
        "test_pattern",
        SourceKind::Input,
        OutputFlags::ASYNC_VIDEO,
        |_, _| Arc::new(TestPattern::default()),
    ));

    let camera = host.create_source("test_pattern", "Camera", &Settings::new())?;

    let mut duplicators = Vec::new();
    for n in 1..=mirrors {
        let settings = Settings::new().with_string(SETTING_TARGET_SOURCE_NAME, "Camera");
        duplicators.push(host.create_source(SOURCE_ID, &format!("Mirror {}", n), &settings)?);
    }

    // The camera has no relay yet; use the first mirror's button to add one
    if let Some(first) = duplicators.first() {
        let added = first.properties().click(PROPERTY_ADD_FILTER);
        println!("Add relay filter: {:?}", added);
    }

    for mirror in &duplicators {
        mirror.inc_showing();
        mirror.inc_active();
    }

    let frame_loop = host.spawn_frame_loop();

    // Device thread: emits frames only while something shows the camera
    let producer = {
        let camera = Arc::clone(&camera);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(33));
            let mut timestamp = 0u64;
            loop {
                ticker.tick().await;
                let running = camera
                    .imp_as::<TestPattern>()
                    .is_some_and(|pattern| pattern.running.load(Ordering::Relaxed));
                if !running {
                    continue;
                }
                timestamp += 33_333_333;
                let frame = VideoFrame::new(VideoFormat::Bgra, 2, 2, timestamp)
                    .with_plane(Bytes::from(vec![0x40; 16]), 8);
                camera.output_video(frame);
            }
        })
    };

    tokio::time::sleep(Duration::from_secs(seconds)).await;

    for mirror in &duplicators {
        mirror.dec_active();
        mirror.dec_showing();
    }

    frame_loop.abort();
    producer.abort();

    println!();
    for mirror in &duplicators {
        println!(
            "{}: received {} frames",
            mirror.name(),
            mirror.with_output(|out| out.video_received())
        );
    }

    if let Some(filter) = find_relay_filter(&camera) {
        if let Some(relay) = filter.imp_as::<RelayFilter>() {
            let stats = relay.stats();
            println!(
                "Relay: broadcasts={} offscreen renders={}",
                stats.video_broadcasts,
                relay.offscreen_passes()
            );
        }
    }
    if let Some(pattern) = camera.imp_as::<TestPattern>() {
        println!("Camera renders: {}", pattern.renders.load(Ordering::Relaxed));
    }

    Ok(())
}
