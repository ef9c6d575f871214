//! Deterministic in-memory backend
//!
//! `SyntheticDecoder` implements the decoder contract over a generated
//! stream, with knobs for the imperfections real backends show: coarse
//! keyframe seeking, unreported positions, wrong metadata, open and decode
//! failures. It backs the test suites and demo wiring, and stands in for a
//! native binding on platforms without one.

use bytes::Bytes;
use framekit_core::{clamp_frame_index, usable_fps, usable_total, VideoDecoder, VideoFrame};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How a synthetic backend resolves a seek target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    /// Cursor lands exactly on the target
    Exact,
    /// Cursor lands on the nearest keyframe at or before the target
    Keyframe,
    /// Every seek is rejected
    Unsupported,
}

/// Failure injection for a synthetic backend
#[derive(Debug, Clone, Default)]
pub struct SyntheticFaults {
    /// `open` returns false
    pub fail_open: bool,
    /// `read` returns `None` while the cursor sits on this frame
    pub fail_read_at: Option<u64>,
    /// `read` panics while the cursor sits on this frame
    pub panic_read_at: Option<u64>,
    /// `close` panics (after releasing)
    pub panic_on_close: bool,
    /// Sleep before every read
    pub read_delay: Duration,
}

/// Shape and behaviour of a generated stream
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    /// Backend name used in logs
    pub name: String,
    /// Frames actually present in the stream
    pub frame_count: u64,
    /// Frame rate the backend reports at open
    pub reported_fps: Option<f64>,
    /// Frame count the backend reports at open
    pub reported_total: Option<u64>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Distance between keyframes, at least 1
    pub keyframe_interval: u64,
    /// Seek behaviour
    pub seek_mode: SeekMode,
    /// When false `cur_frame_id` always answers -1
    pub reports_position: bool,
    /// Injected failures
    pub faults: SyntheticFaults,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            name: "synthetic".to_string(),
            frame_count: 100,
            reported_fps: Some(25.0),
            reported_total: Some(100),
            width: 4,
            height: 4,
            keyframe_interval: 10,
            seek_mode: SeekMode::Exact,
            reports_position: true,
            faults: SyntheticFaults::default(),
        }
    }
}

impl SyntheticProfile {
    /// Profile of a cheap sequential reader: exact seeks, positions
    /// reported, metadata as given
    pub fn fast(frame_count: u64, fps: f64) -> Self {
        Self {
            name: "fast".to_string(),
            frame_count,
            reported_fps: Some(fps),
            reported_total: Some(frame_count),
            ..Self::default()
        }
    }

    /// Profile of a timeline-accurate backend: keyframe seeks, positions
    /// reported as the requested target
    pub fn timeline(frame_count: u64, fps: f64) -> Self {
        Self {
            name: "timeline".to_string(),
            frame_count,
            reported_fps: Some(fps),
            reported_total: Some(frame_count),
            seek_mode: SeekMode::Keyframe,
            ..Self::default()
        }
    }

    /// Replace the seek mode
    pub fn with_seek_mode(mut self, seek_mode: SeekMode) -> Self {
        self.seek_mode = seek_mode;
        self
    }

    /// Replace the injected failures
    pub fn with_faults(mut self, faults: SyntheticFaults) -> Self {
        self.faults = faults;
        self
    }

    /// Replace the reported metadata
    pub fn with_reported(mut self, fps: Option<f64>, total: Option<u64>) -> Self {
        self.reported_fps = fps;
        self.reported_total = total;
        self
    }

    /// Stop reporting positions
    pub fn without_position_reports(mut self) -> Self {
        self.reports_position = false;
        self
    }
}

/// Call counters shared between a synthetic decoder and its observers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntheticStats {
    /// Calls to `open`
    pub opens: u32,
    /// Calls to `close`
    pub closes: u32,
    /// Calls to `seek`, successful or not
    pub seeks: u32,
    /// Target of the last seek call after clamping
    pub last_seek_target: Option<u64>,
    /// Frames delivered
    pub frames_read: u64,
}

/// Handle for inspecting a synthetic decoder after it has been boxed
#[derive(Debug, Clone, Default)]
pub struct SyntheticProbe {
    stats: Arc<Mutex<SyntheticStats>>,
}

impl SyntheticProbe {
    /// Snapshot of the counters
    pub fn stats(&self) -> SyntheticStats {
        self.stats.lock().clone()
    }
}

/// Generated-stream backend
#[derive(Debug)]
pub struct SyntheticDecoder {
    profile: SyntheticProfile,
    is_open: bool,
    fps: Option<f64>,
    total_frames: Option<u64>,
    /// Index of the next frame `read` will produce
    cursor: u64,
    /// Position as the backend reports it; drifts from `cursor` after a
    /// keyframe seek
    reported: u64,
    probe: SyntheticProbe,
}

impl SyntheticDecoder {
    /// Create a closed decoder for the given profile
    pub fn new(profile: SyntheticProfile) -> Self {
        Self {
            profile,
            is_open: false,
            fps: None,
            total_frames: None,
            cursor: 0,
            reported: 0,
            probe: SyntheticProbe::default(),
        }
    }

    /// Observer handle that stays valid after the decoder is moved
    pub fn probe(&self) -> SyntheticProbe {
        self.probe.clone()
    }

    /// Index of the next frame `read` will produce
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    fn render(&self, index: u64) -> VideoFrame {
        let size = self.profile.width as usize * self.profile.height as usize * 3;
        let data = Bytes::from(vec![(index % 256) as u8; size]);
        let interval = self.profile.keyframe_interval.max(1);

        VideoFrame::new(self.profile.width, self.profile.height, data, index, self.fps)
            .with_keyframe(index % interval == 0)
    }
}

impl VideoDecoder for SyntheticDecoder {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn open(&mut self) -> bool {
        self.probe.stats.lock().opens += 1;

        if self.profile.faults.fail_open {
            warn!("{}: cannot open synthetic stream", self.profile.name);
            return false;
        }

        self.is_open = true;
        self.fps = usable_fps(self.profile.reported_fps);
        self.total_frames = usable_total(self.profile.reported_total);
        self.cursor = 0;
        self.reported = 0;
        debug!(
            "{}: opened ({:?} fps, {:?} frames)",
            self.profile.name, self.fps, self.total_frames
        );
        true
    }

    fn close(&mut self) {
        self.probe.stats.lock().closes += 1;
        self.is_open = false;
        self.cursor = 0;
        self.reported = 0;

        if self.profile.faults.panic_on_close {
            panic!("{}: injected close failure", self.profile.name);
        }
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }

    fn seek(&mut self, frame_index: i64) -> bool {
        let target = clamp_frame_index(frame_index, self.total_frames);
        {
            let mut stats = self.probe.stats.lock();
            stats.seeks += 1;
            stats.last_seek_target = Some(target);
        }

        if !self.is_open {
            warn!("{}: seek failed, decoder not opened", self.profile.name);
            return false;
        }

        if target >= self.profile.frame_count {
            debug!("{}: seek target {} past end of stream", self.profile.name, target);
            return false;
        }

        let landed = match self.profile.seek_mode {
            SeekMode::Exact => target,
            SeekMode::Keyframe => target - target % self.profile.keyframe_interval.max(1),
            SeekMode::Unsupported => {
                debug!("{}: seek unsupported", self.profile.name);
                return false;
            }
        };

        self.cursor = landed;
        self.reported = target;
        true
    }

    fn cur_frame_id(&self) -> i64 {
        if !self.profile.reports_position {
            return -1;
        }
        i64::try_from(self.reported).unwrap_or(i64::MAX)
    }

    fn read(&mut self) -> Option<VideoFrame> {
        if !self.is_open {
            return None;
        }

        if !self.profile.faults.read_delay.is_zero() {
            std::thread::sleep(self.profile.faults.read_delay);
        }

        if self.profile.faults.panic_read_at == Some(self.cursor) {
            panic!("{}: injected decode failure at frame {}", self.profile.name, self.cursor);
        }

        if self.cursor >= self.profile.frame_count
            || self.profile.faults.fail_read_at == Some(self.cursor)
        {
            return None;
        }

        let frame = self.render(self.cursor);
        self.cursor += 1;
        self.reported += 1;
        self.probe.stats.lock().frames_read += 1;
        Some(frame)
    }
}
