//! Decoder contract shared by every backend and by the hybrid decoder
//!
//! Backend flakiness is an expected outcome, not an exceptional one: every
//! operation reports failure through its return value (`false` / `None`)
//! and must never panic on a decode, seek or open failure.

use crate::frame::VideoFrame;
use std::fmt;

/// Capability set of an open handle to a video stream
///
/// Decoders are created closed. `open` transitions to ready (or fails),
/// navigation and reads require the ready state, and `close` releases
/// everything and resets the frame counter to 0.
pub trait VideoDecoder: Send + fmt::Debug {
    /// Short backend name used in log output
    fn name(&self) -> &str;

    /// Acquire the stream; `false` on any failure
    ///
    /// On success fps and total frame count are populated best effort;
    /// either may stay unknown.
    fn open(&mut self) -> bool;

    /// Release all resources. Safe to call on a closed decoder.
    fn close(&mut self);

    /// Whether the decoder is currently open
    fn is_open(&self) -> bool;

    /// Frames per second, once resolved
    fn fps(&self) -> Option<f64>;

    /// Estimated total number of frames, once resolved
    fn total_frames(&self) -> Option<u64>;

    /// Position the read cursor so the next `read` yields `frame_index`
    /// or the nearest reachable keyframe at or before it
    ///
    /// The index is clamped with [`clamp_frame_index`] first. On failure the
    /// position must be left untouched.
    fn seek(&mut self, frame_index: i64) -> bool;

    /// Best current estimate of the 0-based frame index
    ///
    /// Repeated calls without an intervening read or seek return the same
    /// value. A negative value means the backend cannot report a position.
    fn cur_frame_id(&self) -> i64;

    /// Decode the next frame; `None` at end of stream or on decode failure
    fn read(&mut self) -> Option<VideoFrame>;
}

impl<D: VideoDecoder + ?Sized> VideoDecoder for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&mut self) -> bool {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn fps(&self) -> Option<f64> {
        (**self).fps()
    }

    fn total_frames(&self) -> Option<u64> {
        (**self).total_frames()
    }

    fn seek(&mut self, frame_index: i64) -> bool {
        (**self).seek(frame_index)
    }

    fn cur_frame_id(&self) -> i64 {
        (**self).cur_frame_id()
    }

    fn read(&mut self) -> Option<VideoFrame> {
        (**self).read()
    }
}

/// Clamp a requested frame index into the valid range
///
/// With a known, non-zero total the index lands in `[0, total - 1]`;
/// otherwise only the lower bound applies.
pub fn clamp_frame_index(frame_index: i64, total_frames: Option<u64>) -> u64 {
    let lower = frame_index.max(0) as u64;
    match total_frames {
        Some(total) if total > 0 => lower.min(total - 1),
        _ => lower,
    }
}

/// Keep an fps report only if it is positive and finite
pub fn usable_fps(fps: Option<f64>) -> Option<f64> {
    fps.filter(|fps| fps.is_finite() && *fps > 0.0)
}

/// Keep a frame count report only if it is non-zero
pub fn usable_total(total: Option<u64>) -> Option<u64> {
    total.filter(|total| *total > 0)
}
