//! Integration tests for the frame history buffer
//!
//! Covers size accounting, eviction order and out-of-range access across
//! a range of capacities.

use framekit_core::*;

fn frame(index: u64) -> VideoFrame {
    VideoFrame::new(2, 2, vec![index as u8; 12], index, Some(30.0))
}

// ============================================================================
// SIZE AND EVICTION
// ============================================================================

#[test]
fn test_size_is_min_of_pushes_and_capacity() {
    for capacity in 1..=8usize {
        for pushes in 0..=20usize {
            let mut buffer = RingBuffer::new(capacity).unwrap();
            (0..pushes).for_each(|i| buffer.push(i));

            assert_eq!(buffer.len(), pushes.min(capacity));
            assert_eq!(buffer.capacity(), capacity);
        }
    }
}

#[test]
fn test_oldest_and_newest_after_wraparound() {
    for capacity in 1..=8usize {
        for pushes in capacity..=(capacity * 3) {
            let mut buffer = RingBuffer::new(capacity).unwrap();
            (0..pushes).for_each(|i| buffer.push(i));

            assert_eq!(buffer.get(0), Some(&(pushes - capacity)));
            assert_eq!(buffer.last(), Some(&(pushes - 1)));
        }
    }
}

#[test]
fn test_capacity_three_scenario() {
    let mut buffer = RingBuffer::new(3).unwrap();
    for name in ["A", "B", "C", "D"] {
        buffer.push(name.to_string());
    }

    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.get(0).map(String::as_str), Some("B"));
    assert_eq!(buffer.get(1).map(String::as_str), Some("C"));
    assert_eq!(buffer.get(2).map(String::as_str), Some("D"));
    assert_eq!(buffer.last().map(String::as_str), Some("D"));
}

// ============================================================================
// OUT-OF-RANGE ACCESS
// ============================================================================

#[test]
fn test_out_of_range_indices_are_empty() {
    let mut buffer = RingBuffer::new(4).unwrap();

    for pushes in 0..10u64 {
        let len = buffer.len() as i64;
        for index in [-100, -1, len, len + 1, 1_000] {
            assert!(buffer.get(index).is_none(), "index {} of {}", index, len);
        }
        buffer.push(frame(pushes));
    }
}

// ============================================================================
// FRAME HISTORY
// ============================================================================

#[test]
fn test_frames_are_kept_in_read_order() {
    let mut history = RingBuffer::new(5).unwrap();
    (0..12).map(frame).for_each(|f| history.push(f));

    let indices: Vec<u64> = history.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![7, 8, 9, 10, 11]);
    assert_eq!(history.last().map(|f| f.index), Some(11));
}

#[test]
fn test_clear_then_reuse() {
    let mut history = RingBuffer::new(2).unwrap();
    history.push(frame(1));
    history.push(frame(2));
    history.clear();

    assert!(history.is_empty());
    assert!(history.get(0).is_none());

    history.push(frame(3));
    assert_eq!(history.get(0).map(|f| f.index), Some(3));
    assert_eq!(history.len(), 1);
}

#[test]
fn test_zero_capacity_is_rejected() {
    let err = tokio_test::assert_err!(RingBuffer::<VideoFrame>::new(0));
    assert_eq!(err.category(), ErrorCategory::Configuration);

    let buffer = tokio_test::assert_ok!(RingBuffer::<VideoFrame>::new(1));
    assert_eq!(buffer.capacity(), 1);
}
