//! Audio packet types
//!
//! Inside a filter chain the host passes `AudioData`: raw planes already in the
//! host's global output format, with no format description attached. Sources
//! submit `SourceAudio`, which carries its own channel layout, sample format
//! and rate. The relay filter converts the former into the latter using the
//! host's `AudioOutputInfo` before broadcasting, because independent consumers
//! need the format to interpret the planes.

use bytes::Bytes;

use super::frame::MAX_AV_PLANES;

/// Channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerLayout {
    Unknown,
    Mono,
    Stereo,
    /// 2.1
    TwoPointOne,
    /// 4.0
    FourPointZero,
    /// 4.1
    FourPointOne,
    /// 5.1
    FivePointOne,
    /// 7.1
    SevenPointOne,
}

impl SpeakerLayout {
    /// Number of channels in this layout
    pub fn channels(&self) -> u32 {
        match self {
            SpeakerLayout::Unknown => 0,
            SpeakerLayout::Mono => 1,
            SpeakerLayout::Stereo => 2,
            SpeakerLayout::TwoPointOne => 3,
            SpeakerLayout::FourPointZero => 4,
            SpeakerLayout::FourPointOne => 5,
            SpeakerLayout::FivePointOne => 6,
            SpeakerLayout::SevenPointOne => 8,
        }
    }
}

/// Sample format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Unknown,
    U8,
    I16,
    I32,
    Float,
    U8Planar,
    I16Planar,
    I32Planar,
    FloatPlanar,
}

/// Global audio output format of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioOutputInfo {
    /// Sample rate in Hz
    pub samples_per_sec: u32,
    /// Sample format
    pub format: AudioFormat,
    /// Channel layout
    pub speakers: SpeakerLayout,
}

impl Default for AudioOutputInfo {
    fn default() -> Self {
        Self {
            samples_per_sec: 48_000,
            format: AudioFormat::FloatPlanar,
            speakers: SpeakerLayout::Stereo,
        }
    }
}

/// Raw audio as seen by a filter
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    /// Sample planes in the host's global format
    pub planes: Vec<Bytes>,
    /// Number of sample frames
    pub frames: u32,
    /// Timestamp in nanoseconds
    pub timestamp: u64,
}

impl AudioData {
    /// Create a raw audio packet
    pub fn new(planes: Vec<Bytes>, frames: u32, timestamp: u64) -> Self {
        let mut planes = planes;
        planes.truncate(MAX_AV_PLANES);
        Self {
            planes,
            frames,
            timestamp,
        }
    }
}

/// Self-describing audio packet submitted by a source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAudio {
    /// Sample planes
    pub planes: Vec<Bytes>,
    /// Number of sample frames
    pub frames: u32,
    /// Channel layout
    pub speakers: SpeakerLayout,
    /// Sample format
    pub format: AudioFormat,
    /// Sample rate in Hz
    pub samples_per_sec: u32,
    /// Timestamp in nanoseconds
    pub timestamp: u64,
}

impl SourceAudio {
    /// Describe raw filter audio using the host's output format
    ///
    /// Planes are shared, not copied.
    pub fn from_raw(audio: &AudioData, info: &AudioOutputInfo) -> Self {
        Self {
            planes: audio.planes.clone(),
            frames: audio.frames,
            speakers: info.speakers,
            format: info.format,
            samples_per_sec: info.samples_per_sec,
            timestamp: audio.timestamp,
        }
    }

    /// Strip the format description, as the host does before filtering
    pub fn to_raw(&self) -> AudioData {
        AudioData::new(self.planes.clone(), self.frames, self.timestamp)
    }
}
