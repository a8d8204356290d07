//! Async output queue
//!
//! Where a source's submitted frames land after its filter chain. Buffered
//! mode keeps frames in order up to a fixed depth; unbuffered mode keeps only
//! the newest frame so it is presented as soon as possible.

use std::collections::VecDeque;

use crate::media::{AudioData, VideoFrame};

/// Frames kept per source in buffered mode
pub const MAX_ASYNC_FRAMES: usize = 30;

/// Audio packets kept per source
pub const MAX_AUDIO_PACKETS: usize = 64;

/// Output queue for one source
#[derive(Debug, Default)]
pub struct AsyncOutput {
    video: VecDeque<VideoFrame>,
    audio: VecDeque<AudioData>,
    unbuffered: bool,
    video_received: u64,
    audio_received: u64,
}

impl AsyncOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch between buffered and unbuffered delivery
    ///
    /// Entering unbuffered mode discards all but the newest frame.
    pub fn set_unbuffered(&mut self, unbuffered: bool) {
        self.unbuffered = unbuffered;
        if unbuffered {
            while self.video.len() > 1 {
                self.video.pop_front();
            }
        }
    }

    pub fn is_unbuffered(&self) -> bool {
        self.unbuffered
    }

    /// Queue a video frame
    pub fn push_video(&mut self, frame: VideoFrame) {
        self.video_received += 1;
        if self.unbuffered {
            self.video.clear();
        } else if self.video.len() >= MAX_ASYNC_FRAMES {
            self.video.pop_front();
        }
        self.video.push_back(frame);
    }

    /// Queue an audio packet
    pub fn push_audio(&mut self, audio: AudioData) {
        self.audio_received += 1;
        if self.audio.len() >= MAX_AUDIO_PACKETS {
            self.audio.pop_front();
        }
        self.audio.push_back(audio);
    }

    /// Take all queued video frames, oldest first
    pub fn drain_video(&mut self) -> Vec<VideoFrame> {
        self.video.drain(..).collect()
    }

    /// Take all queued audio packets, oldest first
    pub fn drain_audio(&mut self) -> Vec<AudioData> {
        self.audio.drain(..).collect()
    }

    /// Frames submitted since creation, including discarded ones
    pub fn video_received(&self) -> u64 {
        self.video_received
    }

    /// Audio packets submitted since creation
    pub fn audio_received(&self) -> u64 {
        self.audio_received
    }
}
