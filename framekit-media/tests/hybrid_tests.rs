//! Integration tests for the hybrid reconciliation decoder
//!
//! Exercises seek routing, authority tracking, metadata resolution and
//! degraded sessions where one backend is unavailable.

use framekit_core::{VideoDecoder, VideoFrame};
use framekit_media::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn hybrid(fast: SyntheticProfile, timeline: SyntheticProfile) -> (HybridDecoder, SyntheticProbe, SyntheticProbe) {
    let fast = SyntheticDecoder::new(fast);
    let timeline = SyntheticDecoder::new(timeline);
    let (fast_probe, timeline_probe) = (fast.probe(), timeline.probe());
    (
        HybridDecoder::new(Box::new(fast), Box::new(timeline)),
        fast_probe,
        timeline_probe,
    )
}

fn failing_open(profile: SyntheticProfile) -> SyntheticProfile {
    profile.with_faults(SyntheticFaults {
        fail_open: true,
        ..Default::default()
    })
}

// ============================================================================
// OPEN AND METADATA
// ============================================================================

#[test]
fn test_open_prefers_timeline_metadata() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(180, 30.0),
        SyntheticProfile::timeline(200, 25.0),
    );

    assert!(decoder.open());
    assert!(decoder.fast_open());
    assert!(decoder.timeline_open());
    assert_eq!(decoder.fps(), Some(25.0));
    assert_eq!(decoder.total_frames(), Some(200));
}

#[test]
fn test_unusable_timeline_fields_fall_back_to_fast() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(180, 30.0),
        SyntheticProfile::timeline(200, 25.0).with_reported(Some(0.0), Some(200)),
    );

    assert!(decoder.open());
    assert_eq!(decoder.fps(), Some(30.0));
    assert_eq!(decoder.total_frames(), Some(200));
}

#[test]
fn test_open_fails_only_when_both_backends_fail() {
    let (mut decoder, _, _) = hybrid(
        failing_open(SyntheticProfile::fast(10, 30.0)),
        failing_open(SyntheticProfile::timeline(10, 30.0)),
    );

    assert!(!decoder.open());
    assert!(!decoder.is_open());
    assert!(decoder.read().is_none());
    assert!(!decoder.seek(3));
}

#[test]
fn test_timeline_open_failure_degrades_to_fast() {
    let (mut decoder, fast_probe, timeline_probe) = hybrid(
        SyntheticProfile::fast(120, 30.0),
        failing_open(SyntheticProfile::timeline(500, 60.0)),
    );

    assert!(decoder.open());
    assert_eq!(decoder.fps(), Some(30.0));
    assert_eq!(decoder.total_frames(), Some(120));

    for target in [10, 90, 45] {
        assert!(decoder.seek(target));
        assert_eq!(decoder.last_seek_authority(), SeekAuthority::Fast);
        assert_eq!(decoder.cur_frame_id(), target);
    }

    assert_eq!(timeline_probe.stats().seeks, 0);
    assert_eq!(fast_probe.stats().seeks, 3);
}

// ============================================================================
// SEEK AUTHORITY
// ============================================================================

#[test]
fn test_timeline_seek_takes_authority() {
    let (mut decoder, fast_probe, _) = hybrid(
        SyntheticProfile::fast(200, 25.0),
        SyntheticProfile::timeline(200, 25.0),
    );
    assert!(decoder.open());

    assert!(decoder.seek(57));
    assert_eq!(decoder.last_seek_authority(), SeekAuthority::Timeline);
    // The timeline backend reports the requested target after a keyframe seek.
    assert_eq!(decoder.cur_frame_id(), 57);
    assert_eq!(fast_probe.stats().last_seek_target, Some(57));
    assert!(decoder.fast_cursor_synced());
}

#[test]
fn test_fast_seek_takes_authority_when_timeline_rejects() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(200, 25.0),
        SyntheticProfile::timeline(200, 25.0).with_seek_mode(SeekMode::Unsupported),
    );
    assert!(decoder.open());

    assert!(decoder.seek(57));
    assert_eq!(decoder.last_seek_authority(), SeekAuthority::Fast);
    assert_eq!(decoder.cur_frame_id(), 57);
    assert_eq!(decoder.read().map(|f| f.index), Some(57));
    assert_eq!(decoder.cur_frame_id(), 58);
}

#[test]
fn test_failed_seek_keeps_position_and_authority() {
    let unsupported = |p: SyntheticProfile| p.with_seek_mode(SeekMode::Unsupported);
    let (mut decoder, _, _) = hybrid(
        unsupported(SyntheticProfile::fast(200, 25.0)),
        unsupported(SyntheticProfile::timeline(200, 25.0)),
    );
    assert!(decoder.open());
    (0..5).for_each(|_| {
        decoder.read();
    });

    let before = decoder.cur_frame_id();
    assert!(!decoder.seek(80));
    assert_eq!(decoder.cur_frame_id(), before);
    assert_eq!(decoder.last_seek_authority(), SeekAuthority::None);
}

#[test]
fn test_authority_survives_failed_seek() {
    // Both backends over-report their length, so seeks past frame 50 fail.
    let (mut short, _, _) = hybrid(
        SyntheticProfile::fast(50, 25.0).with_reported(Some(25.0), Some(100)),
        SyntheticProfile::timeline(50, 25.0).with_reported(Some(25.0), Some(100)),
    );
    assert!(short.open());
    assert!(short.seek(20));
    assert!(!short.seek(80));
    assert_eq!(short.last_seek_authority(), SeekAuthority::Timeline);
    assert_eq!(short.cur_frame_id(), 20);
}

#[test]
fn test_unsynced_fast_cursor_is_reported() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(200, 25.0).with_seek_mode(SeekMode::Unsupported),
        SyntheticProfile::timeline(200, 25.0),
    );
    assert!(decoder.open());
    decoder.read();

    assert!(decoder.seek(100));
    assert_eq!(decoder.last_seek_authority(), SeekAuthority::Timeline);
    assert!(!decoder.fast_cursor_synced());

    // Reads still come from the fast backend's own cursor.
    assert_eq!(decoder.read().map(|f| f.index), Some(1));
    assert_eq!(decoder.cur_frame_id(), 101);
}

// ============================================================================
// POSITION REPORTING
// ============================================================================

#[test]
fn test_reads_come_from_fast_backend() {
    let (mut decoder, fast_probe, timeline_probe) = hybrid(
        SyntheticProfile::fast(200, 25.0),
        SyntheticProfile::timeline(200, 25.0),
    );
    assert!(decoder.open());
    assert!(decoder.seek(37));

    let frame = decoder.read().unwrap();
    assert_eq!(frame.index, 37);
    assert_eq!(decoder.cur_frame_id(), 38);
    assert_eq!(fast_probe.stats().frames_read, 1);
    assert_eq!(timeline_probe.stats().frames_read, 0);
}

#[test]
fn test_position_before_any_seek_prefers_fast_report() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(30, 25.0),
        SyntheticProfile::timeline(30, 25.0),
    );
    assert!(decoder.open());
    (0..3).for_each(|_| {
        decoder.read();
    });
    assert_eq!(decoder.cur_frame_id(), 3);

    let (mut silent, _, _) = hybrid(
        SyntheticProfile::fast(30, 25.0).without_position_reports(),
        SyntheticProfile::timeline(30, 25.0),
    );
    assert!(silent.open());
    (0..4).for_each(|_| {
        silent.read();
    });
    assert_eq!(silent.cur_frame_id(), 4);
}

#[test]
fn test_position_is_stable_between_operations() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(60, 25.0),
        SyntheticProfile::timeline(60, 25.0),
    );
    assert!(decoder.open());
    assert!(decoder.seek(12));
    decoder.read();

    let first = decoder.cur_frame_id();
    assert!((0..10).all(|_| decoder.cur_frame_id() == first));
}

#[test]
fn test_position_is_clamped_at_end_of_stream() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(5, 25.0),
        SyntheticProfile::timeline(5, 25.0),
    );
    assert!(decoder.open());
    while decoder.read().is_some() {}

    assert_eq!(decoder.cur_frame_id(), 4);
}

// ============================================================================
// CLAMP POLICY
// ============================================================================

#[test]
fn test_seek_clamps_negative_without_total() {
    let unknown = |p: SyntheticProfile| p.with_reported(Some(25.0), None);
    let (mut decoder, fast_probe, timeline_probe) = hybrid(
        unknown(SyntheticProfile::fast(100, 25.0)),
        unknown(SyntheticProfile::timeline(100, 25.0)),
    );
    assert!(decoder.open());
    assert_eq!(decoder.total_frames(), None);

    assert!(decoder.seek(-5));
    assert_eq!(timeline_probe.stats().last_seek_target, Some(0));
    assert_eq!(fast_probe.stats().last_seek_target, Some(0));
    assert_eq!(decoder.cur_frame_id(), 0);
}

#[test]
fn test_seek_clamps_past_known_total() {
    let (mut decoder, _, timeline_probe) = hybrid(
        SyntheticProfile::fast(200, 25.0),
        SyntheticProfile::timeline(200, 25.0),
    );
    assert!(decoder.open());

    assert!(decoder.seek(300));
    assert_eq!(timeline_probe.stats().last_seek_target, Some(199));
    assert_eq!(decoder.cur_frame_id(), 199);
}

#[test]
fn test_position_saturates_at_far_end_of_unbounded_stream() {
    let unbounded = |p: SyntheticProfile| p.with_reported(Some(25.0), None);
    let (mut decoder, _, _) = hybrid(
        unbounded(SyntheticProfile::fast(u64::MAX, 25.0)),
        unbounded(SyntheticProfile::timeline(u64::MAX, 25.0)),
    );
    assert!(decoder.open());

    assert!(decoder.seek(i64::MAX));
    assert_eq!(decoder.last_seek_authority(), SeekAuthority::Timeline);
    assert_eq!(decoder.read().map(|f| f.index), Some(i64::MAX as u64));
    assert_eq!(decoder.cur_frame_id(), i64::MAX);
}

#[test]
fn test_unreported_position_saturates_at_far_end() {
    let unbounded = |p: SyntheticProfile| p.with_reported(Some(25.0), None);
    let (mut decoder, _, _) = hybrid(
        unbounded(SyntheticProfile::fast(u64::MAX, 25.0)).without_position_reports(),
        unbounded(SyntheticProfile::timeline(u64::MAX, 25.0)).without_position_reports(),
    );
    assert!(decoder.open());

    assert!(decoder.seek(i64::MAX));
    decoder.read();
    decoder.read();
    assert_eq!(decoder.cur_frame_id(), i64::MAX);
}

// ============================================================================
// CLOSE
// ============================================================================

#[test]
fn test_close_releases_both_backends() {
    let (mut decoder, fast_probe, timeline_probe) = hybrid(
        SyntheticProfile::fast(10, 25.0),
        SyntheticProfile::timeline(10, 25.0),
    );
    assert!(decoder.open());
    assert!(decoder.seek(4));

    decoder.close();
    decoder.close();

    assert!(!decoder.is_open());
    assert_eq!(decoder.last_seek_authority(), SeekAuthority::None);
    assert_eq!(fast_probe.stats().closes, 2);
    assert_eq!(timeline_probe.stats().closes, 2);
}

#[test]
fn test_timeline_closes_even_when_fast_close_panics() {
    let (mut decoder, _, timeline_probe) = hybrid(
        SyntheticProfile::fast(10, 25.0).with_faults(SyntheticFaults {
            panic_on_close: true,
            ..Default::default()
        }),
        SyntheticProfile::timeline(10, 25.0),
    );
    assert!(decoder.open());

    let result = panic::catch_unwind(AssertUnwindSafe(|| decoder.close()));
    assert!(result.is_err());
    assert_eq!(timeline_probe.stats().closes, 1);
    assert!(!decoder.is_open());
}

#[test]
fn test_reopen_starts_a_fresh_session() {
    let (mut decoder, _, _) = hybrid(
        SyntheticProfile::fast(50, 25.0),
        SyntheticProfile::timeline(50, 25.0),
    );
    assert!(decoder.open());
    assert!(decoder.seek(30));
    decoder.close();

    assert!(decoder.open());
    assert_eq!(decoder.last_seek_authority(), SeekAuthority::None);
    assert_eq!(decoder.cur_frame_id(), 0);
    assert_eq!(decoder.read().map(|f| f.index), Some(0));
}

// ============================================================================
// METADATA STABILITY
// ============================================================================

/// Backend whose metadata report changes whenever `drift` is bumped
#[derive(Debug)]
struct DriftingDecoder {
    inner: SyntheticDecoder,
    drift: Arc<AtomicU64>,
}

impl VideoDecoder for DriftingDecoder {
    fn name(&self) -> &str {
        "drifting"
    }

    fn open(&mut self) -> bool {
        self.inner.open()
    }

    fn close(&mut self) {
        self.inner.close()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn fps(&self) -> Option<f64> {
        Some(25.0 + self.drift.load(Ordering::SeqCst) as f64)
    }

    fn total_frames(&self) -> Option<u64> {
        Some(100 * (1 + self.drift.load(Ordering::SeqCst)))
    }

    fn seek(&mut self, frame_index: i64) -> bool {
        self.inner.seek(frame_index)
    }

    fn cur_frame_id(&self) -> i64 {
        self.inner.cur_frame_id()
    }

    fn read(&mut self) -> Option<VideoFrame> {
        self.inner.read()
    }
}

#[test]
fn test_metadata_is_fixed_at_open() {
    let drift = Arc::new(AtomicU64::new(0));
    // Inner stream has no total so it never clamps on its own.
    let inner = SyntheticDecoder::new(
        SyntheticProfile::timeline(1_000, 25.0).with_reported(Some(25.0), None),
    );
    let timeline_probe = inner.probe();
    let timeline = DriftingDecoder {
        inner,
        drift: Arc::clone(&drift),
    };
    let fast = SyntheticDecoder::new(
        SyntheticProfile::fast(1_000, 30.0).with_reported(Some(30.0), None),
    );

    let mut decoder = HybridDecoder::new(Box::new(fast), Box::new(timeline));
    assert!(decoder.open());
    assert_eq!(decoder.fps(), Some(25.0));
    assert_eq!(decoder.total_frames(), Some(100));

    drift.store(4, Ordering::SeqCst);

    assert_eq!(decoder.fps(), Some(25.0));
    assert_eq!(decoder.total_frames(), Some(100));

    assert!(decoder.seek(150));
    assert_eq!(timeline_probe.stats().last_seek_target, Some(99));
    assert_eq!(decoder.cur_frame_id(), 99);

    // A new session picks up the new report.
    decoder.close();
    assert!(decoder.open());
    assert_eq!(decoder.fps(), Some(29.0));
    assert_eq!(decoder.total_frames(), Some(500));
}
