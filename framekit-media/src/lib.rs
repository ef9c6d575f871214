//! # framekit media
//!
//! Frame delivery on top of imperfect decode backends: the hybrid
//! reconciliation decoder, the latest-wins background reader and a
//! deterministic synthetic backend.

#![warn(clippy::all)]

pub mod hybrid;
pub mod reader;
pub mod synthetic;

// Re-export main types
pub use hybrid::{HybridDecoder, SeekAuthority};
pub use reader::{shared_decoder, AsyncFrameReader, SharedDecoder, DEFAULT_STOP_TIMEOUT};
pub use synthetic::{
    SeekMode, SyntheticDecoder, SyntheticFaults, SyntheticProbe, SyntheticProfile, SyntheticStats,
};
