//! Fixed-capacity frame history
//!
//! Holds the most recently pushed items, oldest first. Logical index 0 is
//! the oldest item currently held and `len() - 1` the newest. Pushing into
//! a full buffer silently evicts the oldest item.

use crate::error::{VideoError, VideoResult};

/// Circular buffer with a capacity fixed at construction
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    /// Physical index of the oldest item
    start: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer; `capacity` must be at least 1
    pub fn new(capacity: usize) -> VideoResult<Self> {
        if capacity == 0 {
            return Err(VideoError::InvalidConfiguration {
                message: "RingBuffer capacity must be > 0".to_string(),
            });
        }

        Ok(Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            start: 0,
            len: 0,
        })
    }

    /// Append an item, evicting the oldest one when full
    pub fn push(&mut self, item: T) {
        let capacity = self.capacity();
        let end = (self.start + self.len) % capacity;
        self.slots[end] = Some(item);

        if self.len < capacity {
            self.len += 1;
        } else {
            self.start = (self.start + 1) % capacity;
        }
    }

    /// Item at a logical position; `None` when out of range
    pub fn get(&self, index: i64) -> Option<&T> {
        if index < 0 || index as usize >= self.len {
            return None;
        }

        let physical = (self.start + index as usize) % self.capacity();
        self.slots[physical].as_ref()
    }

    /// Most recently pushed item
    pub fn last(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.get(self.len as i64 - 1)
    }

    /// Drop every item; capacity is unchanged
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.start = 0;
        self.len = 0;
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no items
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of items
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i as i64))
    }
}
