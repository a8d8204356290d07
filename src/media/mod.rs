//! Media payloads carried through the host
//!
//! This module provides:
//! - Asynchronous video frames
//! - Raw filter audio and self-describing source audio
//! - The host's global audio output format

pub mod audio;
pub mod frame;

pub use audio::{AudioData, AudioFormat, AudioOutputInfo, SourceAudio, SpeakerLayout};
pub use frame::{VideoFormat, VideoFrame, MAX_AV_PLANES};
