//! Hybrid reconciliation decoder
//!
//! Fuses a fast backend (cheap sequential reads, coarse seeking and
//! unreliable position reports) with a timeline backend (accurate seek
//! and metadata, never used for bulk reads) behind one [`VideoDecoder`].
//!
//! Which backend's position report is trusted follows the last successful
//! seek: each backend only reports positions reliably relative to
//! operations it performed itself.

use framekit_core::{clamp_frame_index, usable_fps, usable_total, VideoDecoder, VideoFrame};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Backend whose seek most recently succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekAuthority {
    /// No seek has succeeded this session
    #[default]
    None,
    /// The fast backend performed the last successful seek
    Fast,
    /// The timeline backend performed the last successful seek
    Timeline,
}

/// Decoder composed of a fast and a timeline backend
#[derive(Debug)]
pub struct HybridDecoder {
    fast: Box<dyn VideoDecoder>,
    timeline: Box<dyn VideoDecoder>,
    fast_open: bool,
    timeline_open: bool,
    fps: Option<f64>,
    total_frames: Option<u64>,
    last_seek_authority: SeekAuthority,
    /// Clamped target of the last successful seek
    seek_target: u64,
    /// Frames delivered since open or the last successful seek
    reads_since_seek: u64,
    /// Whether the fast cursor accepted the last forwarded seek
    fast_cursor_synced: bool,
}

impl HybridDecoder {
    /// Compose two closed backends
    pub fn new(fast: Box<dyn VideoDecoder>, timeline: Box<dyn VideoDecoder>) -> Self {
        Self {
            fast,
            timeline,
            fast_open: false,
            timeline_open: false,
            fps: None,
            total_frames: None,
            last_seek_authority: SeekAuthority::None,
            seek_target: 0,
            reads_since_seek: 0,
            fast_cursor_synced: true,
        }
    }

    /// Backend whose position report is currently trusted
    pub fn last_seek_authority(&self) -> SeekAuthority {
        self.last_seek_authority
    }

    /// Whether the fast backend opened
    pub fn fast_open(&self) -> bool {
        self.fast_open
    }

    /// Whether the timeline backend opened
    pub fn timeline_open(&self) -> bool {
        self.timeline_open
    }

    /// Whether the fast read cursor followed the last timeline seek
    ///
    /// When false, frames returned by `read` may not correspond to
    /// `cur_frame_id` until the next successful seek. The drift is reported,
    /// not corrected.
    pub fn fast_cursor_synced(&self) -> bool {
        self.fast_cursor_synced
    }

    fn reset_session(&mut self) {
        self.last_seek_authority = SeekAuthority::None;
        self.seek_target = 0;
        self.reads_since_seek = 0;
        self.fast_cursor_synced = true;
    }

    /// Position anchored on a backend report, falling back to the tracked
    /// seek target when the backend does not report one
    fn anchored(&self, reported: i64, add_reads: bool) -> i64 {
        let reads = if add_reads { saturating_i64(self.reads_since_seek) } else { 0 };
        if reported >= 0 {
            reported.saturating_add(reads)
        } else {
            saturating_i64(self.seek_target.saturating_add(self.reads_since_seek))
        }
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl VideoDecoder for HybridDecoder {
    fn name(&self) -> &str {
        "hybrid"
    }

    fn open(&mut self) -> bool {
        self.timeline_open = self.timeline.open();
        self.fast_open = self.fast.open();
        self.reset_session();

        if !self.timeline_open && !self.fast_open {
            warn!(
                "HybridDecoder: unable to open both decoders ({}, {})",
                self.fast.name(),
                self.timeline.name()
            );
            return false;
        }

        if !self.timeline_open {
            warn!("HybridDecoder: timeline backend {} failed to open", self.timeline.name());
        }
        if !self.fast_open {
            warn!("HybridDecoder: fast backend {} failed to open", self.fast.name());
        }

        let timeline_fps = self.timeline_open.then(|| usable_fps(self.timeline.fps())).flatten();
        let timeline_total = self
            .timeline_open
            .then(|| usable_total(self.timeline.total_frames()))
            .flatten();
        let fast_fps = self.fast_open.then(|| usable_fps(self.fast.fps())).flatten();
        let fast_total = self.fast_open.then(|| usable_total(self.fast.total_frames())).flatten();

        self.fps = timeline_fps.or(fast_fps);
        self.total_frames = timeline_total.or(fast_total);

        info!(
            "HybridDecoder opened (fast: {}, timeline: {}, {:?} fps, {:?} frames)",
            self.fast_open, self.timeline_open, self.fps, self.total_frames
        );
        true
    }

    fn close(&mut self) {
        let fast_result = panic::catch_unwind(AssertUnwindSafe(|| self.fast.close()));
        self.timeline.close();

        self.fast_open = false;
        self.timeline_open = false;
        self.reset_session();

        if let Err(payload) = fast_result {
            panic::resume_unwind(payload);
        }
    }

    fn is_open(&self) -> bool {
        self.fast_open || self.timeline_open
    }

    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }

    fn seek(&mut self, frame_index: i64) -> bool {
        let target = clamp_frame_index(frame_index, self.total_frames);

        if self.timeline_open && self.timeline.seek(target as i64) {
            self.fast_cursor_synced = self.fast_open && self.fast.seek(target as i64);
            if !self.fast_cursor_synced {
                debug!(
                    "HybridDecoder: fast cursor not re-synced after timeline seek to {}",
                    target
                );
            }
            self.last_seek_authority = SeekAuthority::Timeline;
            self.seek_target = target;
            self.reads_since_seek = 0;
            return true;
        }

        if self.fast_open && self.fast.seek(target as i64) {
            self.last_seek_authority = SeekAuthority::Fast;
            self.fast_cursor_synced = true;
            self.seek_target = target;
            self.reads_since_seek = 0;
            return true;
        }

        warn!("HybridDecoder: seek failed at frame {}", target);
        false
    }

    fn cur_frame_id(&self) -> i64 {
        let position = match self.last_seek_authority {
            SeekAuthority::Timeline => self.anchored(self.timeline.cur_frame_id(), true),
            SeekAuthority::Fast => self.anchored(self.fast.cur_frame_id(), false),
            SeekAuthority::None => {
                let fast = if self.fast_open { self.fast.cur_frame_id() } else { -1 };
                if fast >= 0 {
                    fast
                } else if self.timeline_open {
                    self.anchored(self.timeline.cur_frame_id(), true)
                } else {
                    saturating_i64(self.reads_since_seek)
                }
            }
        };

        clamp_frame_index(position, self.total_frames) as i64
    }

    fn read(&mut self) -> Option<VideoFrame> {
        if !self.fast_open {
            return None;
        }

        let frame = self.fast.read()?;
        self.reads_since_seek = self.reads_since_seek.saturating_add(1);
        Some(frame)
    }
}
