//! Relay filter statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a relay filter's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Video frames broadcast
    pub video_broadcasts: u64,
    /// Audio packets broadcast
    pub audio_broadcasts: u64,
    /// Video frames not broadcast because a broadcast was already in flight
    pub video_reentries_dropped: u64,
    /// Audio packets not broadcast because a broadcast was already in flight
    pub audio_reentries_dropped: u64,
    /// Audio packets skipped because the global audio format was unavailable
    pub audio_format_missing: u64,
}

/// Live counters behind `RelayStats`
#[derive(Debug, Default)]
pub(crate) struct RelayCounters {
    pub video_broadcasts: AtomicU64,
    pub audio_broadcasts: AtomicU64,
    pub video_reentries_dropped: AtomicU64,
    pub audio_reentries_dropped: AtomicU64,
    pub audio_format_missing: AtomicU64,
}

impl RelayCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStats {
        RelayStats {
            video_broadcasts: self.video_broadcasts.load(Ordering::Relaxed),
            audio_broadcasts: self.audio_broadcasts.load(Ordering::Relaxed),
            video_reentries_dropped: self.video_reentries_dropped.load(Ordering::Relaxed),
            audio_reentries_dropped: self.audio_reentries_dropped.load(Ordering::Relaxed),
            audio_format_missing: self.audio_format_missing.load(Ordering::Relaxed),
        }
    }
}
