//! Video frame type
//!
//! A `VideoFrame` is what an async source hands to the host and what the relay
//! filter re-publishes. Plane data is held in `Bytes`, so cloning a frame for
//! every subscriber only bumps reference counts.
//!
//! ```text
//! +---------+---------+-----+---------+
//! | plane 0 | plane 1 | ... | plane N |   N < MAX_AV_PLANES
//! +---------+---------+-----+---------+
//!   linesize[i] bytes per row of plane i
//! ```

use bytes::Bytes;

/// Maximum number of data planes carried by a frame or audio packet
pub const MAX_AV_PLANES: usize = 8;

/// Pixel layout of a video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    None,
    /// Planar 4:2:0, three planes
    I420,
    /// Semi-planar 4:2:0, two planes
    Nv12,
    /// Packed 4:2:2
    Yuy2,
    /// Packed 4:2:2
    Uyvy,
    Rgba,
    Bgra,
    Bgrx,
}

impl VideoFormat {
    /// Number of planes a frame of this format carries
    pub fn plane_count(&self) -> usize {
        match self {
            VideoFormat::None => 0,
            VideoFormat::I420 => 3,
            VideoFormat::Nv12 => 2,
            VideoFormat::Yuy2
            | VideoFormat::Uyvy
            | VideoFormat::Rgba
            | VideoFormat::Bgra
            | VideoFormat::Bgrx => 1,
        }
    }
}

/// A single asynchronous video frame
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Plane data (zero-copy via reference counting)
    pub planes: Vec<Bytes>,
    /// Bytes per row, one entry per plane
    pub linesize: Vec<u32>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel layout
    pub format: VideoFormat,
    /// Presentation timestamp in nanoseconds
    pub timestamp: u64,
    /// Whether the image is stored bottom-up
    pub flip: bool,
}

impl VideoFrame {
    /// Create a frame with no planes attached yet
    pub fn new(format: VideoFormat, width: u32, height: u32, timestamp: u64) -> Self {
        Self {
            planes: Vec::with_capacity(format.plane_count()),
            linesize: Vec::with_capacity(format.plane_count()),
            width,
            height,
            format,
            timestamp,
            flip: false,
        }
    }

    /// Attach a plane
    ///
    /// Planes past `MAX_AV_PLANES` are ignored.
    pub fn with_plane(mut self, data: Bytes, linesize: u32) -> Self {
        if self.planes.len() < MAX_AV_PLANES {
            self.planes.push(data);
            self.linesize.push(linesize);
        }
        self
    }
}
