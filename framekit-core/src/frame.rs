//! Decoded frame representation

use bytes::Bytes;

/// Decoded video frame
///
/// Pixel data is reference counted so a frame can sit in the ring buffer
/// and in the async reader's slot at the same time without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Raw pixel data (BGR24 unless the backend says otherwise)
    pub data: Bytes,
    /// 0-based index of the frame in the stream, as reported by the backend
    pub index: u64,
    /// Presentation timestamp in milliseconds
    pub timestamp: u64,
    /// Whether this is a keyframe
    pub is_keyframe: bool,
}

impl VideoFrame {
    /// Create a frame, deriving the timestamp from `index` and `fps`
    pub fn new(width: u32, height: u32, data: impl Into<Bytes>, index: u64, fps: Option<f64>) -> Self {
        let timestamp = match fps {
            Some(fps) if fps > 0.0 => ((index as f64 / fps) * 1000.0).round() as u64,
            _ => 0,
        };

        Self {
            width,
            height,
            data: data.into(),
            index,
            timestamp,
            is_keyframe: false,
        }
    }

    /// Mark the frame as a keyframe
    pub fn with_keyframe(mut self, is_keyframe: bool) -> Self {
        self.is_keyframe = is_keyframe;
        self
    }

    /// Size of the pixel payload in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Stream metadata as exposed by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct VideoMetadata {
    /// Frames per second, if known
    pub fps: Option<f64>,
    /// Total frame estimate, if known
    pub total_frames: Option<u64>,
}
