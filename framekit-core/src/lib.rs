//! # framekit core
//!
//! Decoder contract, frame types, error handling and the bounded frame
//! history used by the rest of the framekit workspace.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod decoder;
pub mod error;
pub mod frame;

// Re-export main types
pub use buffer::RingBuffer;
pub use decoder::{clamp_frame_index, usable_fps, usable_total, VideoDecoder};
pub use error::{ErrorCategory, VideoError, VideoResult};
pub use frame::{VideoFrame, VideoMetadata};
